//! In-memory population store
//!
//! A stand-in for the host simulation's storage: buildings live at fixed
//! addresses, households and persons in arenas addressed by stable integer
//! handles with index 0 reserved as the "none" sentinel. Released households
//! go on a free list and are reused.

use ahash::AHashMap;

use crate::core::types::{BuildingId, FrameIndex, HouseholdRef, PersonId, Vec3, Wealth};
use crate::population::{
    walk_chain, BehaviorType, BuildingFlags, BuildingRecord, Household, HouseholdFlags, Person,
    PopulationIndex, PopulationStore,
};

/// Default cap on household records
const DEFAULT_HOUSEHOLD_LIMIT: u32 = 524_288;

/// Arena-backed population store
#[derive(Debug, Clone)]
pub struct CityArena {
    buildings: Vec<Option<BuildingRecord>>,
    households: Vec<Household>,
    free_households: Vec<u32>,
    household_limit: u32,
    persons: Vec<Person>,
    staffing: AHashMap<BuildingId, [u32; 4]>,
    next_building: usize,
    frame: FrameIndex,
}

impl CityArena {
    /// Create an empty city with `address_space` building addresses
    pub fn new(address_space: u32) -> Self {
        Self {
            buildings: vec![None; address_space as usize],
            households: vec![Household::default()],
            free_households: Vec::new(),
            household_limit: DEFAULT_HOUSEHOLD_LIMIT,
            persons: vec![Person::new(0, Wealth::Low)],
            staffing: AHashMap::new(),
            next_building: 1,
            frame: 0,
        }
    }

    /// Cap the number of household records the arena will hand out
    pub fn with_household_limit(mut self, limit: u32) -> Self {
        self.household_limit = limit;
        self
    }

    pub fn address_space(&self) -> usize {
        self.buildings.len()
    }

    /// Place a building at the next free address with `homes` empty rooms
    ///
    /// Returns `BuildingId::NONE` when the address space is full.
    pub fn spawn_building(&mut self, behavior: BehaviorType, position: Vec3, homes: u32) -> BuildingId {
        while self.next_building < self.buildings.len() && self.buildings[self.next_building].is_some() {
            self.next_building += 1;
        }
        if self.next_building >= self.buildings.len() {
            return BuildingId::NONE;
        }
        let id = BuildingId(self.next_building as u16);
        self.spawn_building_at(id, behavior, position, homes);
        id
    }

    /// Place a building at a specific address, replacing whatever was there
    pub fn spawn_building_at(&mut self, id: BuildingId, behavior: BehaviorType, position: Vec3, homes: u32) {
        if id.is_none() || id.index() >= self.buildings.len() {
            return;
        }
        self.buildings[id.index()] = Some(BuildingRecord::new(behavior, position));
        if homes > 0 {
            let flags = HouseholdFlags::HOME | HouseholdFlags::CREATED;
            if let Some(head) = self.create_households(homes, id, flags) {
                self.set_household_head(id, head);
            }
        }
    }

    pub fn set_building_flags(&mut self, id: BuildingId, flags: BuildingFlags) {
        if let Some(Some(record)) = self.buildings.get_mut(id.index()) {
            record.flags = flags;
        }
    }

    /// Add a living, homeless person
    pub fn spawn_person(&mut self, age: u8, wealth: Wealth) -> PersonId {
        self.persons.push(Person::new(age, wealth));
        PersonId((self.persons.len() - 1) as u32)
    }

    /// Give a person a home in the first Home room of `building` with a free slot
    pub fn move_in(&mut self, person: PersonId, building: BuildingId) -> Option<HouseholdRef> {
        let head = self.building(building)?.household_head;
        let room = walk_chain(self, head)
            .find(|(_, household)| household.is_home() && household.free_slot().is_some())
            .map(|(r, _)| r)?;
        self.set_home(person, building, room);
        Some(room)
    }

    pub fn person_mut(&mut self, person: PersonId) -> Option<&mut Person> {
        if person.is_none() {
            return None;
        }
        self.persons.get_mut(person.0 as usize)
    }

    pub fn person_count(&self) -> usize {
        self.persons.len() - 1
    }

    pub fn set_staffed_workers(&mut self, building: BuildingId, workers: [u32; 4]) {
        self.staffing.insert(building, workers);
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Every household reachable from a building's anchor, in chain order
    pub fn chain_of(&self, building: BuildingId) -> Vec<HouseholdRef> {
        match self.building(building) {
            Some(record) => walk_chain(self, record.household_head).map(|(r, _)| r).collect(),
            None => Vec::new(),
        }
    }

    /// Number of Home-flagged records reachable from a building's anchor
    pub fn home_room_count(&self, building: BuildingId) -> usize {
        match self.building(building) {
            Some(record) => walk_chain(self, record.household_head)
                .filter(|(_, household)| household.is_home())
                .count(),
            None => 0,
        }
    }

    /// Household records currently handed out
    pub fn live_household_count(&self) -> usize {
        self.households.len() - 1 - self.free_households.len()
    }

    fn household_mut(&mut self, household: HouseholdRef) -> Option<&mut Household> {
        if household.is_none() {
            return None;
        }
        self.households.get_mut(household.0 as usize)
    }

    fn allocate_household(&mut self, building: BuildingId, flags: HouseholdFlags) -> Option<HouseholdRef> {
        let record = Household::new(building, flags);
        if let Some(index) = self.free_households.pop() {
            self.households[index as usize] = record;
            return Some(HouseholdRef(index));
        }
        if self.households.len() as u32 > self.household_limit {
            return None;
        }
        self.households.push(record);
        Some(HouseholdRef((self.households.len() - 1) as u32))
    }

    fn vacate_slot(&mut self, person: PersonId, household: HouseholdRef) {
        if let Some(record) = self.household_mut(household) {
            if let Some(slot) = record.slot_of(person) {
                record.slots[slot] = PersonId::NONE;
            }
        }
    }
}

impl Default for CityArena {
    fn default() -> Self {
        Self::new(192 * 256)
    }
}

impl PopulationIndex for CityArena {
    fn building(&self, id: BuildingId) -> Option<BuildingRecord> {
        if id.is_none() {
            return None;
        }
        self.buildings.get(id.index()).copied().flatten()
    }

    fn household(&self, household: HouseholdRef) -> Option<Household> {
        if household.is_none() {
            return None;
        }
        self.households.get(household.0 as usize).copied()
    }

    fn person(&self, person: PersonId) -> Option<Person> {
        if person.is_none() {
            return None;
        }
        self.persons.get(person.0 as usize).copied()
    }

    fn household_capacity(&self) -> u32 {
        self.household_limit
    }

    fn staffed_workers(&self, building: BuildingId) -> [u32; 4] {
        self.staffing.get(&building).copied().unwrap_or_default()
    }

    fn current_frame_index(&self) -> FrameIndex {
        self.frame
    }
}

impl PopulationStore for CityArena {
    fn create_households(
        &mut self,
        count: u32,
        building: BuildingId,
        flags: HouseholdFlags,
    ) -> Option<HouseholdRef> {
        if count == 0 {
            return None;
        }
        // All or nothing
        let available = self.free_households.len() as u64
            + (self.household_limit as u64 + 1).saturating_sub(self.households.len() as u64);
        if (count as u64) > available {
            return None;
        }

        let mut head = HouseholdRef::NONE;
        let mut tail = HouseholdRef::NONE;
        for _ in 0..count {
            let created = self.allocate_household(building, flags)?;
            if head.is_none() {
                head = created;
            } else {
                self.set_household_next(tail, created);
            }
            tail = created;
        }
        Some(head)
    }

    fn release_household(&mut self, household: HouseholdRef) {
        if let Some(record) = self.household_mut(household) {
            *record = Household::default();
            self.free_households.push(household.0);
        }
    }

    fn set_household_next(&mut self, household: HouseholdRef, next: HouseholdRef) {
        if let Some(record) = self.household_mut(household) {
            record.next = next;
        }
    }

    fn set_household_head(&mut self, building: BuildingId, head: HouseholdRef) {
        if let Some(Some(record)) = self.buildings.get_mut(building.index()) {
            record.household_head = head;
        }
    }

    fn set_home(&mut self, person: PersonId, building: BuildingId, household: HouseholdRef) {
        let Some(current) = self.person(person) else {
            return;
        };
        let Some(slot) = self.household(household).and_then(|h| h.free_slot()) else {
            tracing::warn!("No free slot in household {:?} for person {:?}", household, person);
            return;
        };

        self.vacate_slot(person, current.home_household);
        if let Some(record) = self.household_mut(household) {
            record.slots[slot] = person;
        }
        if let Some(record) = self.person_mut(person) {
            record.home_building = building;
            record.home_household = household;
        }
    }

    fn clear_home(&mut self, person: PersonId) {
        let Some(current) = self.person(person) else {
            return;
        };
        self.vacate_slot(person, current.home_household);
        if let Some(record) = self.person_mut(person) {
            record.home_building = BuildingId::NONE;
            record.home_household = HouseholdRef::NONE;
        }
    }

    fn clear_work_or_student(&mut self, person: PersonId) {
        if let Some(record) = self.person_mut(person) {
            record.work_building = BuildingId::NONE;
        }
    }

    fn clear_visit(&mut self, person: PersonId) {
        if let Some(record) = self.person_mut(person) {
            record.visit_building = BuildingId::NONE;
        }
    }

    fn clear_vehicle(&mut self, person: PersonId) {
        if let Some(record) = self.person_mut(person) {
            record.vehicle = 0;
        }
    }
}
