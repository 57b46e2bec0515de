//! Per-facility lifecycle and production tick

use serde::Serialize;

use crate::admission::AdmissionScorer;
use crate::capacity::{CapacityReconciler, ReconcileOutcome};
use crate::core::config::CareConfig;
use crate::facility::{first_empty_room, occupancy, Facility, NumWorkers, Occupancy};
use crate::matching::{CandidatePool, Eligibility};
use crate::population::PopulationStore;
use crate::rng::SimRng;

/// What one production tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProductionOutcome {
    /// Building missing, not created, or reporting an operational problem
    Skipped,
    NoVacancy,
    NoMatch,
    Admitted(u32),
    Declined,
}

/// Drives one facility: capacity on lifecycle events, admissions on production ticks
#[derive(Debug, Clone)]
pub struct FacilityController {
    facility: Facility,
    eligibility: Eligibility,
    scorer: AdmissionScorer,
    rng: SimRng,
}

impl FacilityController {
    pub fn new(facility: Facility, config: &CareConfig) -> Self {
        let seed = config.simulation.seed ^ u64::from(facility.building.0);
        Self {
            eligibility: Eligibility::new(facility.kind, config.ages),
            scorer: AdmissionScorer::new(config.scoring.clone(), config.ages),
            rng: SimRng::from_seed_u64(seed),
            facility,
        }
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    /// Building placed: create the full set of rooms
    pub fn on_created<S: PopulationStore + ?Sized>(&mut self, store: &mut S) -> ReconcileOutcome {
        CapacityReconciler::reconcile(store, self.facility.building, self.facility.modified_capacity(), true)
    }

    /// Save loaded: adopt the current modifier but leave creation to the host
    pub fn on_loaded<S: PopulationStore + ?Sized>(&mut self, store: &mut S, modifier: f32) -> ReconcileOutcome {
        self.facility.capacity_modifier = modifier;
        CapacityReconciler::reconcile(store, self.facility.building, self.facility.modified_capacity(), false)
    }

    /// Building moved: same as a load
    pub fn on_relocated<S: PopulationStore + ?Sized>(&mut self, store: &mut S, modifier: f32) -> ReconcileOutcome {
        self.on_loaded(store, modifier)
    }

    /// Capacity setting changed at runtime
    pub fn apply_capacity_modifier<S: PopulationStore + ?Sized>(
        &mut self,
        store: &mut S,
        modifier: f32,
    ) -> ReconcileOutcome {
        tracing::info!(
            "Capacity modifier of {} facility {:?}: {} -> {}",
            self.facility.kind,
            self.facility.building,
            self.facility.capacity_modifier,
            modifier
        );
        self.facility.capacity_modifier = modifier;
        CapacityReconciler::reconcile(store, self.facility.building, self.facility.modified_capacity(), true)
    }

    pub fn occupancy<S: PopulationStore + ?Sized>(&self, store: &S) -> Occupancy {
        occupancy(store, &self.facility)
    }

    /// Try to fill one empty room from the pool
    ///
    /// Every claim taken from the pool is released before returning.
    pub fn production_tick<S: PopulationStore + ?Sized>(
        &mut self,
        store: &mut S,
        pool: &CandidatePool,
    ) -> ProductionOutcome {
        let building = self.facility.building;
        match store.building(building) {
            Some(record) if record.is_created() && !record.has_problem() => {}
            _ => return ProductionOutcome::Skipped,
        }

        let Some(room) = first_empty_room(&*store, &self.facility) else {
            return ProductionOutcome::NoVacancy;
        };
        let Some(family) = pool.draw(&*store) else {
            return ProductionOutcome::NoMatch;
        };

        let staffing = NumWorkers::snapshot(&*store, building, self.facility.settings.staffing_targets);
        let admit = self
            .scorer
            .should_admit(&family, &self.facility, &*store, &mut self.rng, &staffing);

        let mut moved = 0;
        for &person_id in family.iter().filter(|p| p.is_some()) {
            let Some(person) = store.person(person_id) else {
                pool.release(person_id);
                continue;
            };
            if self.eligibility.is_candidate(&person) {
                if admit {
                    store.set_home(person_id, building, room);
                    moved += 1;
                }
                pool.release(person_id);
            }
        }

        if admit {
            tracing::info!(
                "{} facility {:?} admitted {} residents into room {:?}",
                self.facility.kind,
                building,
                moved,
                room
            );
            ProductionOutcome::Admitted(moved)
        } else {
            ProductionOutcome::Declined
        }
    }

    /// Move aged-out residents out of one room
    ///
    /// The discharge pool is shared by every facility of this kind, so the
    /// drawn room may belong to another building. Its residents leave all the
    /// same. Returns how many residents left.
    pub fn discharge_tick<S: PopulationStore + ?Sized>(&mut self, store: &mut S, pool: &CandidatePool) -> u32 {
        let Some(leaving) = pool.draw_discharge(&*store) else {
            return 0;
        };

        let mut discharged = 0;
        for &person_id in leaving.iter().filter(|p| p.is_some()) {
            let Some(person) = store.person(person_id) else {
                pool.release(person_id);
                continue;
            };
            if self.eligibility.is_discharge_candidate(&person, &*store) {
                store.clear_home(person_id);
                discharged += 1;
                tracing::info!(
                    "{} facility {:?} discharged resident {:?} of {:?}",
                    self.facility.kind,
                    self.facility.building,
                    person_id,
                    person.home_building
                );
            }
            pool.release(person_id);
        }
        discharged
    }
}
