//! Candidate pool - households waiting to be offered to a facility
//!
//! Two collections (households to admit, facility rooms to discharge) sit
//! behind one non-blocking guard that the scanner shares. Persons handed out
//! by a draw are held in the in-flight set until the caller releases them.

use std::sync::{Mutex, MutexGuard};

use ahash::AHashSet;

use crate::core::config::MatchingConfig;
use crate::core::types::{FamilySlots, HouseholdRef, PersonId};
use crate::matching::eligibility::Eligibility;
use crate::matching::guard::TryLock;
use crate::population::PopulationIndex;
use crate::rng::{RandomSource, SimRng};

/// Household refs without duplicates, drawn by random index
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    entries: Vec<HouseholdRef>,
    members: AHashSet<HouseholdRef>,
}

impl CandidateList {
    /// Add a household; returns false if it was already queued
    pub fn push(&mut self, household: HouseholdRef) -> bool {
        if household.is_none() || !self.members.insert(household) {
            return false;
        }
        self.entries.push(household);
        true
    }

    /// Remove and return a uniformly chosen entry
    pub fn take_random<R: RandomSource>(&mut self, rng: &mut R) -> Option<HouseholdRef> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.random_uint(self.entries.len() as u32) as usize;
        let household = self.entries.swap_remove(index);
        self.members.remove(&household);
        Some(household)
    }

    pub fn contains(&self, household: HouseholdRef) -> bool {
        self.members.contains(&household)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.members.clear();
    }
}

/// Pool contents guarded by the single-writer lock
#[derive(Debug)]
pub struct PoolState {
    pub admit: CandidateList,
    pub discharge: CandidateList,
    rng: SimRng,
}

/// Shared candidate pool for one facility kind
#[derive(Debug)]
pub struct CandidatePool {
    eligibility: Eligibility,
    default_attempts: u32,
    state: TryLock<PoolState>,
    in_flight: Mutex<AHashSet<PersonId>>,
}

impl CandidatePool {
    /// A zero attempt budget is raised to 1
    pub fn new(eligibility: Eligibility, config: &MatchingConfig) -> Self {
        if config.search_attempts == 0 {
            tracing::warn!("{} pool: search_attempts 0 raised to 1", eligibility.kind);
        }
        Self {
            eligibility,
            default_attempts: config.search_attempts.max(1),
            state: TryLock::new(PoolState {
                admit: CandidateList::default(),
                discharge: CandidateList::default(),
                rng: SimRng::from_seed_u64(config.pool_seed),
            }),
            in_flight: Mutex::new(AHashSet::new()),
        }
    }

    pub fn eligibility(&self) -> &Eligibility {
        &self.eligibility
    }

    /// Take the single-writer guard, or `None` under contention
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, PoolState>> {
        self.state.try_acquire()
    }

    /// Current in-flight claims
    pub fn claims(&self) -> MutexGuard<'_, AHashSet<PersonId>> {
        match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Recovered poisoned in-flight set");
                poisoned.into_inner()
            }
        }
    }

    /// Draw one household to admit with the configured attempt budget
    pub fn draw<I: PopulationIndex + ?Sized>(&self, index: &I) -> Option<FamilySlots> {
        self.draw_with_attempts(index, self.default_attempts)
    }

    /// Draw one household to admit, giving up after `max_attempts` households
    ///
    /// The returned array holds every occupant of the household in slot
    /// order. Its category-eligible members are now in flight and must each
    /// be passed to [`CandidatePool::release`] once processed.
    pub fn draw_with_attempts<I: PopulationIndex + ?Sized>(
        &self,
        index: &I,
        max_attempts: u32,
    ) -> Option<FamilySlots> {
        let mut state = self.state.try_acquire()?;
        let mut claims = self.claims();

        for attempt in 0..max_attempts {
            let PoolState { admit, rng, .. } = &mut *state;
            let household_ref = admit.take_random(rng)?;
            let Some(household) = index.household(household_ref) else {
                continue;
            };

            let mut family = [PersonId::NONE; 5];
            let mut eligible_present = false;
            let mut still_valid = true;
            for (slot, &person_id) in household.slots.iter().enumerate() {
                if person_id.is_none() {
                    continue;
                }
                family[slot] = person_id;
                let Some(person) = index.person(person_id) else {
                    continue;
                };
                if self.eligibility.is_candidate(&person) {
                    if !self.eligibility.validate(person_id, &person, index, &claims) {
                        still_valid = false;
                        break;
                    }
                    eligible_present = true;
                }
            }

            if !still_valid || !eligible_present {
                tracing::debug!(
                    "Stale candidate household {:?} on attempt {}",
                    household_ref,
                    attempt + 1
                );
                continue;
            }

            for &person_id in family.iter().filter(|p| p.is_some()) {
                if let Some(person) = index.person(person_id) {
                    if self.eligibility.is_candidate(&person) {
                        claims.insert(person_id);
                    }
                }
            }
            tracing::debug!("Drew {} household {:?}: {:?}", self.eligibility.kind, household_ref, family);
            return Some(family);
        }
        None
    }

    /// Draw one facility room with aged-out residents
    pub fn draw_discharge<I: PopulationIndex + ?Sized>(&self, index: &I) -> Option<FamilySlots> {
        self.draw_discharge_with_attempts(index, self.default_attempts)
    }

    /// Draw one facility room, returning only its aged-out residents
    ///
    /// Other slots are zero. Returned residents are in flight until released.
    pub fn draw_discharge_with_attempts<I: PopulationIndex + ?Sized>(
        &self,
        index: &I,
        max_attempts: u32,
    ) -> Option<FamilySlots> {
        let mut state = self.state.try_acquire()?;
        let mut claims = self.claims();

        for _ in 0..max_attempts {
            let PoolState { discharge, rng, .. } = &mut *state;
            let household_ref = discharge.take_random(rng)?;
            let Some(household) = index.household(household_ref) else {
                continue;
            };

            let mut leaving = [PersonId::NONE; 5];
            let mut found = false;
            let mut still_valid = true;
            for (slot, &person_id) in household.slots.iter().enumerate() {
                let Some(person) = index.person(person_id) else {
                    continue;
                };
                if !self.eligibility.is_discharge_candidate(&person, index) {
                    continue;
                }
                if claims.contains(&person_id) {
                    still_valid = false;
                    break;
                }
                leaving[slot] = person_id;
                found = true;
            }

            if !still_valid || !found {
                continue;
            }

            for &person_id in leaving.iter().filter(|p| p.is_some()) {
                claims.insert(person_id);
            }
            tracing::debug!("Drew discharge room {:?}: {:?}", household_ref, leaving);
            return Some(leaving);
        }
        None
    }

    /// End a claim handed out by a draw
    pub fn release(&self, person: PersonId) {
        self.claims().remove(&person);
    }

    pub fn is_in_flight(&self, person: PersonId) -> bool {
        self.claims().contains(&person)
    }

    pub fn in_flight_count(&self) -> usize {
        self.claims().len()
    }

    /// Queued admit candidates, or `None` while the guard is held
    pub fn admit_len(&self) -> Option<usize> {
        self.state.try_acquire().map(|state| state.admit.len())
    }

    pub fn discharge_len(&self) -> Option<usize> {
        self.state.try_acquire().map(|state| state.discharge.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AgeLimits, Vec3, Wealth};
    use crate::facility::FacilityKind;
    use crate::population::{BehaviorType, CityArena};

    fn senior_pool() -> CandidatePool {
        CandidatePool::new(
            Eligibility::new(FacilityKind::SeniorCare, AgeLimits::default()),
            &MatchingConfig::default(),
        )
    }

    fn house_with(city: &mut CityArena, ages: &[u8]) -> HouseholdRef {
        let house = city.spawn_building(BehaviorType::Residential, Vec3::default(), 1);
        let mut room = HouseholdRef::NONE;
        for &age in ages {
            let person = city.spawn_person(age, Wealth::Medium);
            room = city.move_in(person, house).unwrap();
        }
        room
    }

    #[test]
    fn test_candidate_list_dedupes() {
        let mut list = CandidateList::default();
        assert!(list.push(HouseholdRef(4)));
        assert!(!list.push(HouseholdRef(4)));
        assert!(!list.push(HouseholdRef::NONE));
        assert_eq!(list.len(), 1);

        let mut rng = SimRng::default();
        assert_eq!(list.take_random(&mut rng), Some(HouseholdRef(4)));
        assert!(list.is_empty());
        assert!(!list.contains(HouseholdRef(4)));
        assert_eq!(list.take_random(&mut rng), None);
    }

    #[test]
    fn test_draw_from_empty_pool() {
        let city = CityArena::new(16);
        assert!(senior_pool().draw(&city).is_none());
    }

    #[test]
    fn test_draw_returns_family_and_claims_seniors() {
        let mut city = CityArena::new(16);
        let room = house_with(&mut city, &[200, 100]);
        let pool = senior_pool();
        pool.try_acquire().unwrap().admit.push(room);

        let family = pool.draw(&city).unwrap();
        let members: Vec<PersonId> = family.iter().copied().filter(|p| p.is_some()).collect();
        assert_eq!(members.len(), 2);
        assert!(pool.is_in_flight(members[0]));
        // Adults ride along but are not claimed
        assert!(!pool.is_in_flight(members[1]));
        assert_eq!(pool.admit_len(), Some(0));

        pool.release(members[0]);
        assert_eq!(pool.in_flight_count(), 0);
    }

    #[test]
    fn test_draw_skips_stale_households() {
        let mut city = CityArena::new(16);
        let no_seniors = house_with(&mut city, &[100]);
        let pool = senior_pool();
        pool.try_acquire().unwrap().admit.push(no_seniors);
        assert!(pool.draw(&city).is_none());

        let claimed = house_with(&mut city, &[200]);
        let senior = city.household(claimed).unwrap().slots[0];
        pool.claims().insert(senior);
        pool.try_acquire().unwrap().admit.push(claimed);
        assert!(pool.draw(&city).is_none());
    }

    #[test]
    fn test_attempt_budget_is_respected() {
        let mut city = CityArena::new(16);
        let pool = senior_pool();
        {
            let mut state = pool.try_acquire().unwrap();
            for _ in 0..3 {
                state.admit.push(house_with(&mut city, &[100]));
            }
        }
        let good = house_with(&mut city, &[210]);
        pool.try_acquire().unwrap().admit.push(good);

        // One attempt consumes exactly one household
        let _ = pool.draw_with_attempts(&city, 1);
        assert_eq!(pool.admit_len(), Some(3));

        assert!(pool.draw_with_attempts(&city, 0).is_none());
        assert_eq!(pool.admit_len(), Some(3));
    }

    #[test]
    fn test_stale_household_is_skipped_within_one_draw() {
        let mut city = CityArena::new(16);
        let stale = house_with(&mut city, &[100]);
        let good = house_with(&mut city, &[210]);
        let senior = city.household(good).unwrap().slots[0];
        let pool = senior_pool();
        {
            let mut state = pool.try_acquire().unwrap();
            state.admit.push(stale);
            state.admit.push(good);
        }

        // Whichever order the two come out in, two attempts reach the senior
        let family = pool.draw_with_attempts(&city, 2).unwrap();
        assert_eq!(family[0], senior);
        assert!(pool.is_in_flight(senior));
        assert!(pool.admit_len().unwrap() <= 1);
    }

    #[test]
    fn test_zero_attempt_config_still_draws() {
        let mut city = CityArena::new(16);
        let room = house_with(&mut city, &[200]);
        let config = MatchingConfig {
            search_attempts: 0,
            ..Default::default()
        };
        let pool = CandidatePool::new(
            Eligibility::new(FacilityKind::SeniorCare, AgeLimits::default()),
            &config,
        );
        pool.try_acquire().unwrap().admit.push(room);
        assert!(pool.draw(&city).is_some());
    }

    #[test]
    fn test_draw_yields_nothing_under_contention() {
        let mut city = CityArena::new(16);
        let room = house_with(&mut city, &[200]);
        let pool = senior_pool();
        pool.try_acquire().unwrap().admit.push(room);

        let held = pool.try_acquire();
        assert!(pool.draw(&city).is_none());
        drop(held);
        assert!(pool.draw(&city).is_some());
    }

    #[test]
    fn test_discharge_draw_returns_only_aged_out() {
        let mut city = CityArena::new(16);
        let orphanage = city.spawn_building(BehaviorType::ChildCare, Vec3::default(), 1);
        let grown = city.spawn_person(50, Wealth::Low);
        let kid = city.spawn_person(10, Wealth::Low);
        let room = city.move_in(grown, orphanage).unwrap();
        city.move_in(kid, orphanage).unwrap();

        let pool = CandidatePool::new(
            Eligibility::new(FacilityKind::ChildCare, AgeLimits::default()),
            &MatchingConfig::default(),
        );
        pool.try_acquire().unwrap().discharge.push(room);

        let leaving = pool.draw_discharge(&city).unwrap();
        assert_eq!(leaving, [grown, PersonId::NONE, PersonId::NONE, PersonId::NONE, PersonId::NONE]);
        assert!(pool.is_in_flight(grown));
        assert!(!pool.is_in_flight(kid));
        assert_eq!(city.person(grown).unwrap().home_building, orphanage);
    }
}
