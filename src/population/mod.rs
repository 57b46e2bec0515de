//! Population layer - the host's building, household and person store
//!
//! The care subsystem never owns population data. It reads through
//! [`PopulationIndex`] and writes through [`PopulationStore`], so tests and the
//! driver binary can plug in the in-memory [`CityArena`].

pub mod arena;
pub mod chain;
pub mod records;

pub use arena::CityArena;
pub use chain::{walk_chain, ChainWalk};
pub use records::{
    BehaviorType, BuildingFlags, BuildingRecord, Household, HouseholdFlags, Person,
};

use crate::core::types::{BuildingId, FrameIndex, HouseholdRef, PersonId};

/// Read-only view over the host population and building store
pub trait PopulationIndex {
    /// Building at an address; `None` for unused addresses
    fn building(&self, id: BuildingId) -> Option<BuildingRecord>;

    fn household(&self, household: HouseholdRef) -> Option<Household>;

    fn person(&self, person: PersonId) -> Option<Person>;

    /// Total household records the host can hold
    ///
    /// No valid chain is longer than this, which makes it the corruption
    /// bound for every chain traversal.
    fn household_capacity(&self) -> u32;

    /// Workers currently employed at a building, per education tier
    fn staffed_workers(&self, building: BuildingId) -> [u32; 4];

    fn current_frame_index(&self) -> FrameIndex;
}

/// Mutating operations the care subsystem may perform on the host store
pub trait PopulationStore: PopulationIndex {
    /// Allocate `count` linked, empty households owned by `building`
    ///
    /// Returns the head of the new chain, or `None` if the host could not
    /// allocate the records.
    fn create_households(
        &mut self,
        count: u32,
        building: BuildingId,
        flags: HouseholdFlags,
    ) -> Option<HouseholdRef>;

    /// Zero a household record and return it to the host
    fn release_household(&mut self, household: HouseholdRef);

    fn set_household_next(&mut self, household: HouseholdRef, next: HouseholdRef);

    fn set_household_head(&mut self, building: BuildingId, head: HouseholdRef);

    /// Move a person into a household, leaving their previous home
    fn set_home(&mut self, person: PersonId, building: BuildingId, household: HouseholdRef);

    fn clear_home(&mut self, person: PersonId);

    fn clear_work_or_student(&mut self, person: PersonId);

    fn clear_visit(&mut self, person: PersonId);

    fn clear_vehicle(&mut self, person: PersonId);
}
