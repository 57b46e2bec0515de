//! Host record types: buildings, households (rooms) and persons
//!
//! These are plain copies of what the host store holds. The care subsystem
//! reads them through [`PopulationIndex`](super::PopulationIndex) and mutates
//! the host only through [`PopulationStore`](super::PopulationStore).

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingId, FamilySlots, HouseholdRef, PersonId, Vec3, Wealth};

/// Role flags carried by a household record
///
/// A household can carry several roles at once; checks are bitwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HouseholdFlags(pub u8);

impl HouseholdFlags {
    pub const NONE: HouseholdFlags = HouseholdFlags(0);
    pub const HOME: HouseholdFlags = HouseholdFlags(0b0000_0001);
    pub const WORK: HouseholdFlags = HouseholdFlags(0b0000_0010);
    pub const STUDENT: HouseholdFlags = HouseholdFlags(0b0000_0100);
    pub const VISIT: HouseholdFlags = HouseholdFlags(0b0000_1000);
    pub const VEHICLE: HouseholdFlags = HouseholdFlags(0b0001_0000);
    pub const CREATED: HouseholdFlags = HouseholdFlags(0b1000_0000);

    /// True if every bit of `other` is set
    #[inline]
    pub fn contains(&self, other: HouseholdFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set
    #[inline]
    pub fn intersects(&self, other: HouseholdFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: HouseholdFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: HouseholdFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for HouseholdFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        HouseholdFlags(self.0 | rhs.0)
    }
}

/// A fixed five-slot occupancy record linked into a building's chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub flags: HouseholdFlags,
    /// Next record in the owning building's chain (NONE ends the chain)
    pub next: HouseholdRef,
    pub building: BuildingId,
    pub slots: FamilySlots,
}

impl Household {
    pub fn new(building: BuildingId, flags: HouseholdFlags) -> Self {
        Self {
            flags,
            next: HouseholdRef::NONE,
            building,
            slots: [PersonId::NONE; 5],
        }
    }

    /// Only Home-flagged households count as rooms
    #[inline]
    pub fn is_home(&self) -> bool {
        self.flags.contains(HouseholdFlags::HOME)
    }

    /// Empty iff all five slots are zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|p| p.is_none())
    }

    pub fn occupant_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_some()).count()
    }

    /// Non-zero occupants in slot order
    pub fn occupants(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.slots.iter().copied().filter(|p| p.is_some())
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|p| p.is_none())
    }

    pub fn slot_of(&self, person: PersonId) -> Option<usize> {
        if person.is_none() {
            return None;
        }
        self.slots.iter().position(|&p| p == person)
    }
}

/// What kind of simulation behavior a building runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorType {
    /// Generic residential building
    Residential,
    SeniorCare,
    ChildCare,
    /// Anything else the host simulates (offices, shops, services)
    Other,
}

/// Building state flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingFlags(pub u8);

impl BuildingFlags {
    pub const NONE: BuildingFlags = BuildingFlags(0);
    pub const CREATED: BuildingFlags = BuildingFlags(0b01);
    /// Power, water, road access, fire, staffing or manual shutdown problem
    pub const OPERATIONAL_PROBLEM: BuildingFlags = BuildingFlags(0b10);

    #[inline]
    pub fn contains(&self, other: BuildingFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: BuildingFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: BuildingFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for BuildingFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BuildingFlags(self.0 | rhs.0)
    }
}

/// Snapshot of one building record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub flags: BuildingFlags,
    pub behavior: BehaviorType,
    /// Anchor of the building's household chain
    pub household_head: HouseholdRef,
    pub position: Vec3,
}

impl BuildingRecord {
    pub fn new(behavior: BehaviorType, position: Vec3) -> Self {
        Self {
            flags: BuildingFlags::CREATED,
            behavior,
            household_head: HouseholdRef::NONE,
            position,
        }
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.flags.contains(BuildingFlags::CREATED)
    }

    #[inline]
    pub fn has_problem(&self) -> bool {
        self.flags.contains(BuildingFlags::OPERATIONAL_PROBLEM)
    }
}

/// Snapshot of one person record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub created: bool,
    pub dead: bool,
    pub age: u8,
    pub wealth: Wealth,
    pub home_building: BuildingId,
    pub home_household: HouseholdRef,
    pub work_building: BuildingId,
    pub visit_building: BuildingId,
    pub vehicle: u16,
}

impl Person {
    pub fn new(age: u8, wealth: Wealth) -> Self {
        Self {
            created: true,
            dead: false,
            age,
            wealth,
            home_building: BuildingId::NONE,
            home_household: HouseholdRef::NONE,
            work_building: BuildingId::NONE,
            visit_building: BuildingId::NONE,
            vehicle: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.created && !self.dead
    }

    pub fn is_homeless(&self) -> bool {
        self.home_building.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_household_flags_bitwise() {
        let flags = HouseholdFlags::HOME | HouseholdFlags::VISIT;
        assert!(flags.contains(HouseholdFlags::HOME));
        assert!(flags.contains(HouseholdFlags::VISIT));
        assert!(!flags.contains(HouseholdFlags::WORK));
        assert!(flags.intersects(HouseholdFlags::WORK | HouseholdFlags::VISIT));
        assert!(!flags.contains(HouseholdFlags::HOME | HouseholdFlags::WORK));

        let mut flags = flags;
        flags.remove(HouseholdFlags::HOME);
        assert!(!flags.contains(HouseholdFlags::HOME));
        flags.insert(HouseholdFlags::VEHICLE);
        assert!(flags.contains(HouseholdFlags::VEHICLE));
    }

    #[test]
    fn test_household_emptiness() {
        let mut household = Household::new(BuildingId(3), HouseholdFlags::HOME);
        assert!(household.is_empty());
        assert!(household.is_home());
        assert_eq!(household.free_slot(), Some(0));

        household.slots[2] = PersonId(9);
        assert!(!household.is_empty());
        assert_eq!(household.occupant_count(), 1);
        assert_eq!(household.slot_of(PersonId(9)), Some(2));
        assert_eq!(household.slot_of(PersonId::NONE), None);
        assert_eq!(household.occupants().collect::<Vec<_>>(), vec![PersonId(9)]);
    }

    #[test]
    fn test_person_status() {
        let mut person = Person::new(200, Wealth::Medium);
        assert!(person.is_alive());
        assert!(person.is_homeless());
        person.dead = true;
        assert!(!person.is_alive());
    }
}
