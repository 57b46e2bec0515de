//! Care facility configuration with documented constants
//!
//! Every tunable of the scanner, the candidate pool, the admission scorer and
//! the capacity settings lives here. Values load from TOML; missing keys fall
//! back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CareError, Result};
use crate::core::types::AgeLimits;

/// Top-level configuration passed to every component constructor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareConfig {
    pub scan: ScanConfig,
    pub matching: MatchingConfig,
    pub ages: AgeLimits,
    pub capacity: CapacityConfig,
    pub scoring: ScoringConfig,
    pub simulation: SimulationConfig,
}

/// How the scanner walks the building address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// One fixed-size slice per frame, amortized over `slice_count` frames
    Sliced,
    /// Clear the pools and sweep everything every `full_rebuild_interval` frames
    FullRebuild,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Building addresses examined per slice
    pub slice_size: u32,

    /// Number of slices covering the whole address space
    ///
    /// `slice_size * slice_count` is the size of the building address space.
    /// At 192 x 256 a full sliced sweep takes 256 frames.
    pub slice_count: u32,

    /// Frames to idle after completing a full sweep
    pub sweep_cooldown_frames: u32,

    pub mode: ScanMode,

    /// Frames between rebuilds in `FullRebuild` mode
    pub full_rebuild_interval: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            slice_size: 192,
            slice_count: 256,
            sweep_cooldown_frames: 0,
            mode: ScanMode::Sliced,
            full_rebuild_interval: 600,
        }
    }
}

impl ScanConfig {
    /// Total number of building addresses the scanner covers
    pub fn address_space(&self) -> u32 {
        self.slice_size * self.slice_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Households drawn before `draw` gives up
    pub search_attempts: u32,

    /// Seed of the pool's own random stream
    pub pool_seed: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            search_attempts: 3,
            pool_seed: 73,
        }
    }
}

/// Global capacity scale factors, one per facility kind
///
/// A value of 0 or below means "use the configured room count unscaled".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub senior_care_modifier: f32,
    pub child_care_modifier: f32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            senior_care_modifier: 1.0,
            child_care_modifier: 1.0,
        }
    }
}

/// Admission scoring weights
///
/// The score is the sum of five factors, each bounded by its maximum here.
/// A uniform draw in `[0, draw_ceiling)` is compared against the score, so a
/// score at or above the ceiling always admits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub age_max: f32,
    pub distance_max: f32,
    pub family_max: f32,
    pub quality_max: f32,
    pub staffing_max: f32,
    pub draw_ceiling: u32,

    /// Share of `staffing_max` lost when a tier is fully unstaffed
    ///
    /// Order: uneducated, educated, well educated, highly educated.
    pub staffing_tier_weights: [f32; 4],
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            age_max: 100.0,
            distance_max: 100.0,
            family_max: 100.0,
            quality_max: 200.0,
            staffing_max: 100.0,
            draw_ceiling: 500,
            staffing_tier_weights: [0.15, 0.45, 0.25, 0.15],
        }
    }
}

impl ScoringConfig {
    /// Sentinel far below any reachable positive total
    pub fn never(&self) -> f32 {
        -(self.draw_ceiling as f32 * 10.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Frames between two production ticks of the same facility
    pub production_interval: u32,

    /// Seed for facility-level randomness
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            production_interval: 256,
            seed: 42,
        }
    }
}

impl CareConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CareConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.scan.slice_size == 0 || self.scan.slice_count == 0 {
            return Err(CareError::InvalidConfig(
                "scan.slice_size and scan.slice_count must be positive".into(),
            ));
        }

        // Building ids are 16-bit
        if self.scan.address_space() > u16::MAX as u32 + 1 {
            return Err(CareError::InvalidConfig(format!(
                "scan address space ({}) exceeds the building id range",
                self.scan.address_space()
            )));
        }

        if self.scan.mode == ScanMode::FullRebuild && self.scan.full_rebuild_interval == 0 {
            return Err(CareError::InvalidConfig(
                "scan.full_rebuild_interval must be positive in full_rebuild mode".into(),
            ));
        }

        if self.matching.search_attempts == 0 {
            return Err(CareError::InvalidConfig(
                "matching.search_attempts must be at least 1".into(),
            ));
        }

        let ages = &self.ages;
        if !(ages.child < ages.teen
            && ages.teen < ages.young
            && ages.young < ages.adult
            && ages.adult < ages.senior)
        {
            return Err(CareError::InvalidConfig(format!(
                "age limits must be strictly increasing: {:?}",
                ages
            )));
        }
        if ages.adult < 15 {
            return Err(CareError::InvalidConfig(
                "ages.adult must be at least 15".into(),
            ));
        }

        if self.scoring.draw_ceiling == 0 {
            return Err(CareError::InvalidConfig(
                "scoring.draw_ceiling must be positive".into(),
            ));
        }
        if self
            .scoring
            .staffing_tier_weights
            .iter()
            .any(|w| !(0.0..=1.0).contains(w))
        {
            return Err(CareError::InvalidConfig(
                "scoring.staffing_tier_weights must lie in [0, 1]".into(),
            ));
        }

        if self.simulation.production_interval == 0 {
            return Err(CareError::InvalidConfig(
                "simulation.production_interval must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CareConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.address_space(), 192 * 256);
        assert_eq!(config.matching.search_attempts, 3);
        assert_eq!(config.scoring.draw_ceiling, 500);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [scan]
            slice_size = 16
            slice_count = 4

            [capacity]
            senior_care_modifier = 1.5
        "#;

        let config = CareConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.scan.slice_size, 16);
        assert_eq!(config.scan.slice_count, 4);
        assert_eq!(config.scan.mode, ScanMode::Sliced);
        assert_eq!(config.capacity.senior_care_modifier, 1.5);
        assert_eq!(config.capacity.child_care_modifier, 1.0);
        assert_eq!(config.ages, AgeLimits::default());
    }

    #[test]
    fn test_scan_mode_parses_snake_case() {
        let toml_str = r#"
            [scan]
            mode = "full_rebuild"
            full_rebuild_interval = 300
        "#;

        let config = CareConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.scan.mode, ScanMode::FullRebuild);
        assert_eq!(config.scan.full_rebuild_interval, 300);
    }

    #[test]
    fn test_rejects_oversized_address_space() {
        let mut config = CareConfig::default();
        config.scan.slice_count = 1024;
        assert!(matches!(
            config.validate(),
            Err(CareError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_unordered_ages() {
        let mut config = CareConfig::default();
        config.ages.teen = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_toml() {
        let result = CareConfig::from_toml_str("[scan\nslice_size = ");
        assert!(matches!(result, Err(CareError::ConfigParse(_))));
    }

    #[test]
    fn test_never_sentinel_is_far_below_zero() {
        let scoring = ScoringConfig::default();
        assert!(scoring.never() < -(scoring.draw_ceiling as f32));
    }
}
