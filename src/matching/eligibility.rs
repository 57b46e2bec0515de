//! Who may move into, or must move out of, a facility of a given kind

use ahash::AHashSet;

use crate::core::types::{AgeLimits, PersonId};
use crate::facility::FacilityKind;
use crate::population::{BuildingRecord, Household, Person, PopulationIndex};

/// Pool a household belongs in after a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Admit,
    Discharge,
    Skip,
}

/// Category rules for one facility kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eligibility {
    pub kind: FacilityKind,
    pub ages: AgeLimits,
}

impl Eligibility {
    pub fn new(kind: FacilityKind, ages: AgeLimits) -> Self {
        Self { kind, ages }
    }

    /// Alive and inside the category's age band
    pub fn is_candidate(&self, person: &Person) -> bool {
        person.is_alive() && self.kind.is_category_age(person.age, &self.ages)
    }

    /// Candidate still free to be offered
    ///
    /// Fails when the person is already claimed, has no home, or already
    /// lives in a facility of the same kind.
    pub fn validate<I: PopulationIndex + ?Sized>(
        &self,
        person_id: PersonId,
        person: &Person,
        index: &I,
        in_flight: &AHashSet<PersonId>,
    ) -> bool {
        if in_flight.contains(&person_id) {
            return false;
        }
        if person.is_homeless() {
            return false;
        }
        !self.lives_in_own_kind(person, index)
    }

    /// Resident of a child-care facility who has aged out of the band
    pub fn is_discharge_candidate<I: PopulationIndex + ?Sized>(&self, person: &Person, index: &I) -> bool {
        self.kind == FacilityKind::ChildCare
            && person.is_alive()
            && !self.kind.is_category_age(person.age, &self.ages)
            && self.lives_in_own_kind(person, index)
    }

    /// Decide which pool, if any, a Home household of `building` goes into
    pub fn classify<I: PopulationIndex + ?Sized>(
        &self,
        building: &BuildingRecord,
        household: &Household,
        index: &I,
        in_flight: &AHashSet<PersonId>,
    ) -> Classification {
        let own_kind = building.behavior == self.kind.behavior();
        for person_id in household.occupants() {
            let Some(person) = index.person(person_id) else {
                continue;
            };
            if !person.created {
                continue;
            }

            if own_kind {
                if !in_flight.contains(&person_id) && self.is_discharge_candidate(&person, index) {
                    return Classification::Discharge;
                }
            } else if self.is_candidate(&person) && self.validate(person_id, &person, index, in_flight) {
                return Classification::Admit;
            }
        }
        Classification::Skip
    }

    fn lives_in_own_kind<I: PopulationIndex + ?Sized>(&self, person: &Person, index: &I) -> bool {
        index
            .building(person.home_building)
            .map(|home| home.behavior == self.kind.behavior())
            .unwrap_or(false)
    }
}
