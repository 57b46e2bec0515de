//! Room occupancy queries over a facility's household chain

use serde::Serialize;

use crate::core::types::HouseholdRef;
use crate::facility::Facility;
use crate::population::{walk_chain, PopulationIndex};

/// Residents and rooms of one facility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub residents: u32,
    pub rooms_occupied: u32,
    pub rooms_total: u32,
}

impl Occupancy {
    pub fn rooms_free(&self) -> u32 {
        self.rooms_total - self.rooms_occupied
    }
}

/// Count residents and rooms reachable from the facility's anchor
pub fn occupancy<I: PopulationIndex + ?Sized>(index: &I, facility: &Facility) -> Occupancy {
    let Some(building) = index.building(facility.building) else {
        return Occupancy::default();
    };

    let mut result = Occupancy::default();
    for (_, household) in walk_chain(index, building.household_head) {
        if !household.is_home() {
            continue;
        }
        result.rooms_total += 1;
        let residents = household.occupant_count() as u32;
        if residents > 0 {
            result.rooms_occupied += 1;
            result.residents += residents;
        }
    }
    result
}

/// First empty Home room in chain order
pub fn first_empty_room<I: PopulationIndex + ?Sized>(index: &I, facility: &Facility) -> Option<HouseholdRef> {
    let building = index.building(facility.building)?;
    walk_chain(index, building.household_head)
        .find(|(_, household)| household.is_home() && household.is_empty())
        .map(|(room, _)| room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Vec3, Wealth};
    use crate::facility::{FacilityKind, FacilitySettings};
    use crate::population::{BehaviorType, CityArena};

    fn setup(rooms: u32) -> (CityArena, Facility) {
        let mut city = CityArena::new(64);
        let building = city.spawn_building(BehaviorType::SeniorCare, Vec3::default(), rooms);
        let facility = Facility::new(building, FacilityKind::SeniorCare, FacilitySettings::default());
        (city, facility)
    }

    #[test]
    fn test_occupancy_of_empty_facility() {
        let (city, facility) = setup(4);
        let result = occupancy(&city, &facility);
        assert_eq!(result, Occupancy { residents: 0, rooms_occupied: 0, rooms_total: 4 });
        assert_eq!(result.rooms_free(), 4);
    }

    #[test]
    fn test_occupancy_counts_residents() {
        let (mut city, facility) = setup(3);
        let a = city.spawn_person(200, Wealth::Low);
        let b = city.spawn_person(205, Wealth::Low);
        // Both land in the first room, the second person fills slot 1
        city.move_in(a, facility.building).unwrap();
        city.move_in(b, facility.building).unwrap();

        let result = occupancy(&city, &facility);
        assert_eq!(result.residents, 2);
        assert_eq!(result.rooms_occupied, 1);
        assert_eq!(result.rooms_total, 3);
    }

    #[test]
    fn test_first_empty_room_skips_occupied() {
        let (mut city, facility) = setup(2);
        let rooms = city.chain_of(facility.building);
        assert_eq!(first_empty_room(&city, &facility), Some(rooms[0]));

        let person = city.spawn_person(200, Wealth::Low);
        city.move_in(person, facility.building).unwrap();
        assert_eq!(first_empty_room(&city, &facility), Some(rooms[1]));
    }

    #[test]
    fn test_full_facility_has_no_empty_room() {
        let (mut city, facility) = setup(1);
        let person = city.spawn_person(200, Wealth::Low);
        city.move_in(person, facility.building).unwrap();
        assert_eq!(first_empty_room(&city, &facility), None);
    }
}
