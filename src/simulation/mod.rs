//! Frame driver - orchestrates scanning and facility ticks
//!
//! Each frame advances both scanners by one slice, then runs the production
//! tick of every facility whose turn it is:
//! scan -> draw -> score -> admit or decline -> release
//!
//! Facilities are spread across frames by building address, so with the
//! default interval of 256 every facility ticks once per 256 frames.

pub mod controller;

pub use controller::{FacilityController, ProductionOutcome};

use serde::Serialize;

use crate::capacity::ReconcileOutcome;
use crate::core::config::CareConfig;
use crate::core::error::{CareError, Result};
use crate::core::types::{BuildingId, FrameIndex};
use crate::facility::{Facility, FacilityKind, FacilitySettings, Occupancy};
use crate::matching::{CandidatePool, Eligibility, EligibilityScanner, ScanOutcome};
use crate::population::PopulationStore;

/// Events generated during a frame
///
/// Returned by [`CareSimulation::run_frame`] for callers that want a log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CareEvent {
    /// Residents moved into a facility
    Admitted {
        building: BuildingId,
        kind: FacilityKind,
        residents: u32,
    },
    /// A drawn household scored too low this time
    Declined { building: BuildingId, kind: FacilityKind },
    /// Aged-out residents were discharged during `building`'s tick
    Discharged { building: BuildingId, residents: u32 },
    /// A scanner finished its last slice or a full rebuild
    SweepCompleted { kind: FacilityKind, frame: FrameIndex },
}

/// Running totals since the simulation started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub frames: u64,
    pub slices_scanned: u64,
    pub scans_contended: u64,
    pub production_ticks: u64,
    pub admitted: u64,
    pub declined: u64,
    pub no_match: u64,
    pub discharged: u64,
}

/// Scanner and pool serving every facility of one kind
#[derive(Debug)]
pub struct CareLane {
    pub kind: FacilityKind,
    pub scanner: EligibilityScanner,
    pub pool: CandidatePool,
}

impl CareLane {
    fn new(kind: FacilityKind, config: &CareConfig) -> Self {
        let eligibility = Eligibility::new(kind, config.ages);
        Self {
            kind,
            scanner: EligibilityScanner::new(eligibility, config.scan.clone()),
            pool: CandidatePool::new(eligibility, &config.matching),
        }
    }
}

/// The care subsystem bound to one host store
pub struct CareSimulation<S: PopulationStore> {
    store: S,
    config: CareConfig,
    senior: CareLane,
    child: CareLane,
    controllers: Vec<FacilityController>,
    stats: SimulationStats,
}

impl<S: PopulationStore> CareSimulation<S> {
    /// Validate `config` and wrap `store`
    pub fn new(store: S, config: CareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            senior: CareLane::new(FacilityKind::SeniorCare, &config),
            child: CareLane::new(FacilityKind::ChildCare, &config),
            store,
            config,
            controllers: Vec::new(),
            stats: SimulationStats::default(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &CareConfig {
        &self.config
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn controllers(&self) -> &[FacilityController] {
        &self.controllers
    }

    pub fn lane(&self, kind: FacilityKind) -> &CareLane {
        match kind {
            FacilityKind::SeniorCare => &self.senior,
            FacilityKind::ChildCare => &self.child,
        }
    }

    pub fn lane_mut(&mut self, kind: FacilityKind) -> &mut CareLane {
        match kind {
            FacilityKind::SeniorCare => &mut self.senior,
            FacilityKind::ChildCare => &mut self.child,
        }
    }

    /// Register a facility on an existing building and create its rooms
    pub fn add_facility(
        &mut self,
        building: BuildingId,
        kind: FacilityKind,
        settings: FacilitySettings,
    ) -> Result<ReconcileOutcome> {
        if self.store.building(building).is_none() {
            return Err(CareError::BuildingNotFound(building));
        }
        let facility = Facility::new(building, kind, settings).with_modifier(kind.modifier(&self.config.capacity));
        let mut controller = FacilityController::new(facility, &self.config);
        let outcome = controller.on_created(&mut self.store);
        self.controllers.push(controller);
        Ok(outcome)
    }

    /// Change the global capacity modifier of one kind and re-reconcile its facilities
    pub fn apply_capacity_modifier(&mut self, kind: FacilityKind, modifier: f32) -> Vec<ReconcileOutcome> {
        match kind {
            FacilityKind::SeniorCare => self.config.capacity.senior_care_modifier = modifier,
            FacilityKind::ChildCare => self.config.capacity.child_care_modifier = modifier,
        }
        let mut outcomes = Vec::new();
        for controller in self.controllers.iter_mut().filter(|c| c.facility().kind == kind) {
            outcomes.push(controller.apply_capacity_modifier(&mut self.store, modifier));
        }
        outcomes
    }

    /// Run the frame the host store is currently on
    pub fn step(&mut self) -> Vec<CareEvent> {
        let frame = self.store.current_frame_index();
        self.run_frame(frame)
    }

    /// Advance scanners and run the facilities due at `frame`
    pub fn run_frame(&mut self, frame: FrameIndex) -> Vec<CareEvent> {
        let mut events = Vec::new();
        self.stats.frames += 1;

        for kind in [FacilityKind::SeniorCare, FacilityKind::ChildCare] {
            let lane = match kind {
                FacilityKind::SeniorCare => &mut self.senior,
                FacilityKind::ChildCare => &mut self.child,
            };
            let slice_count = self.config.scan.slice_count;
            match lane.scanner.advance_tick(frame, &self.store, &lane.pool) {
                ScanOutcome::Scanned { slice, .. } => {
                    self.stats.slices_scanned += 1;
                    if slice + 1 == slice_count {
                        events.push(CareEvent::SweepCompleted { kind, frame });
                    }
                }
                ScanOutcome::Rebuilt { .. } => {
                    self.stats.slices_scanned += u64::from(slice_count);
                    events.push(CareEvent::SweepCompleted { kind, frame });
                }
                ScanOutcome::Contended => self.stats.scans_contended += 1,
                ScanOutcome::CoolingDown | ScanOutcome::Idle => {}
            }
        }

        let interval = self.config.simulation.production_interval;
        for controller in &mut self.controllers {
            let building = controller.facility().building;
            let kind = controller.facility().kind;
            if u32::from(building.0) % interval != frame % interval {
                continue;
            }
            let pool = match kind {
                FacilityKind::SeniorCare => &self.senior.pool,
                FacilityKind::ChildCare => &self.child.pool,
            };

            self.stats.production_ticks += 1;
            match controller.production_tick(&mut self.store, pool) {
                ProductionOutcome::Admitted(residents) => {
                    self.stats.admitted += u64::from(residents);
                    events.push(CareEvent::Admitted { building, kind, residents });
                }
                ProductionOutcome::Declined => {
                    self.stats.declined += 1;
                    events.push(CareEvent::Declined { building, kind });
                }
                ProductionOutcome::NoMatch => self.stats.no_match += 1,
                ProductionOutcome::Skipped | ProductionOutcome::NoVacancy => {}
            }

            if kind == FacilityKind::ChildCare {
                let residents = controller.discharge_tick(&mut self.store, pool);
                if residents > 0 {
                    self.stats.discharged += u64::from(residents);
                    events.push(CareEvent::Discharged { building, residents });
                }
            }
        }
        events
    }

    /// Occupancy of every registered facility
    pub fn occupancy_report(&self) -> Vec<(BuildingId, FacilityKind, Occupancy)> {
        self.controllers
            .iter()
            .map(|c| (c.facility().building, c.facility().kind, c.occupancy(&self.store)))
            .collect()
    }
}
