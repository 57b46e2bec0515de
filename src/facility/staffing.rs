//! Staffing snapshot used by the admission scorer

use serde::{Deserialize, Serialize};

use crate::core::types::BuildingId;
use crate::population::PopulationIndex;

/// Target and realized worker counts per education tier
///
/// Built fresh for each scoring call and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumWorkers {
    pub targets: [u32; 4],
    pub realized: [u32; 4],
}

impl NumWorkers {
    pub fn new(targets: [u32; 4], realized: [u32; 4]) -> Self {
        Self { targets, realized }
    }

    /// Every tier at its target
    pub fn fully_staffed(targets: [u32; 4]) -> Self {
        Self { targets, realized: targets }
    }

    /// Snapshot a building's current workforce against its targets
    pub fn snapshot<I: PopulationIndex + ?Sized>(index: &I, building: BuildingId, targets: [u32; 4]) -> Self {
        Self {
            targets,
            realized: index.staffed_workers(building),
        }
    }

    /// Fraction of a tier's target that is not filled, in [0, 1]
    ///
    /// Tiers with a zero target are never short.
    pub fn unmet_fraction(&self, tier: usize) -> f32 {
        let target = self.targets[tier];
        if target == 0 {
            return 0.0;
        }
        let missing = target.saturating_sub(self.realized[tier]);
        missing as f32 / target as f32
    }
}
