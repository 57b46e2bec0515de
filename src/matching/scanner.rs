//! Amortized population scanner
//!
//! Walks the building address space one slice per frame and fills the
//! candidate pool with households worth offering. A full sweep is spread
//! over `slice_count` frames so no single frame pays for the whole city.

use ahash::AHashSet;

use crate::core::config::{ScanConfig, ScanMode};
use crate::core::types::{BuildingId, FrameIndex, PersonId};
use crate::matching::eligibility::{Classification, Eligibility};
use crate::matching::pool::{CandidatePool, PoolState};
use crate::population::{walk_chain, BehaviorType, PopulationIndex};

/// What one call to [`EligibilityScanner::advance_tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Pause or post-sweep cooldown in effect
    CoolingDown,
    /// The pool guard was held elsewhere; the slice is retried next frame
    Contended,
    Scanned {
        slice: u32,
        admitted: u32,
        discharged: u32,
    },
    /// Full rebuild completed
    Rebuilt { admitted: u32, discharged: u32 },
    /// Full rebuild mode between rebuilds
    Idle,
}

/// Per-kind scanner with a persistent slice cursor
#[derive(Debug, Clone)]
pub struct EligibilityScanner {
    eligibility: Eligibility,
    config: ScanConfig,
    cursor: u32,
    cooldown: u32,
}

#[derive(Debug, Default)]
struct SliceTally {
    admitted: u32,
    discharged: u32,
}

impl EligibilityScanner {
    /// Zero slice counts and rebuild intervals are raised to 1
    pub fn new(eligibility: Eligibility, mut config: ScanConfig) -> Self {
        if config.slice_count == 0 || config.full_rebuild_interval == 0 {
            tracing::warn!(
                "{} scanner: slice_count {} and full_rebuild_interval {} raised to at least 1",
                eligibility.kind,
                config.slice_count,
                config.full_rebuild_interval
            );
            config.slice_count = config.slice_count.max(1);
            config.full_rebuild_interval = config.full_rebuild_interval.max(1);
        }
        Self {
            eligibility,
            config,
            cursor: 0,
            cooldown: 0,
        }
    }

    /// Next slice to scan
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Skip scanning for the next `frames` frames
    pub fn pause(&mut self, frames: u32) {
        self.cooldown = self.cooldown.max(frames);
    }

    /// Run this frame's share of scanning
    pub fn advance_tick<I: PopulationIndex + ?Sized>(
        &mut self,
        frame: FrameIndex,
        index: &I,
        pool: &CandidatePool,
    ) -> ScanOutcome {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return ScanOutcome::CoolingDown;
        }

        match self.config.mode {
            ScanMode::Sliced => self.scan_next_slice(index, pool),
            ScanMode::FullRebuild => self.rebuild_if_due(frame, index, pool),
        }
    }

    fn scan_next_slice<I: PopulationIndex + ?Sized>(&mut self, index: &I, pool: &CandidatePool) -> ScanOutcome {
        let Some(mut state) = pool.try_acquire() else {
            return ScanOutcome::Contended;
        };

        let slice = self.cursor;
        let tally = {
            let claims = pool.claims();
            self.scan_slice(slice, index, &mut state, &claims)
        };

        self.cursor = (slice + 1) % self.config.slice_count;
        if self.cursor == 0 {
            self.cooldown = self.config.sweep_cooldown_frames;
        }

        tracing::debug!(
            "{} scan slice {}: {} to admit, {} to discharge",
            self.eligibility.kind,
            slice,
            tally.admitted,
            tally.discharged
        );
        ScanOutcome::Scanned {
            slice,
            admitted: tally.admitted,
            discharged: tally.discharged,
        }
    }

    fn rebuild_if_due<I: PopulationIndex + ?Sized>(
        &mut self,
        frame: FrameIndex,
        index: &I,
        pool: &CandidatePool,
    ) -> ScanOutcome {
        if frame % self.config.full_rebuild_interval != 0 {
            return ScanOutcome::Idle;
        }
        let Some(mut state) = pool.try_acquire() else {
            return ScanOutcome::Contended;
        };

        state.admit.clear();
        state.discharge.clear();

        let claims = pool.claims();
        let mut admitted = 0;
        let mut discharged = 0;
        for slice in 0..self.config.slice_count {
            let tally = self.scan_slice(slice, index, &mut state, &claims);
            admitted += tally.admitted;
            discharged += tally.discharged;
        }

        tracing::debug!(
            "{} pool rebuilt: {} to admit, {} to discharge",
            self.eligibility.kind,
            admitted,
            discharged
        );
        ScanOutcome::Rebuilt { admitted, discharged }
    }

    fn scan_slice<I: PopulationIndex + ?Sized>(
        &self,
        slice: u32,
        index: &I,
        state: &mut PoolState,
        claims: &AHashSet<PersonId>,
    ) -> SliceTally {
        let mut tally = SliceTally::default();
        let first = slice.saturating_mul(self.config.slice_size);
        let last = first.saturating_add(self.config.slice_size);
        let own_behavior = self.eligibility.kind.behavior();

        for address in first..last {
            // Address 0 is the "no building" sentinel
            if address == 0 || address > u16::MAX as u32 {
                continue;
            }
            let Some(building) = index.building(BuildingId(address as u16)) else {
                continue;
            };
            if building.behavior != BehaviorType::Residential && building.behavior != own_behavior {
                continue;
            }
            if !building.is_created() {
                continue;
            }

            for (household_ref, household) in walk_chain(index, building.household_head) {
                if !household.is_home() || household.is_empty() {
                    continue;
                }
                match self.eligibility.classify(&building, &household, index, claims) {
                    Classification::Admit => {
                        if state.admit.push(household_ref) {
                            tally.admitted += 1;
                        }
                    }
                    Classification::Discharge => {
                        if state.discharge.push(household_ref) {
                            tally.discharged += 1;
                        }
                    }
                    Classification::Skip => {}
                }
            }
        }
        tally
    }
}
