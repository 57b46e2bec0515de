//! Care facilities - buildings that house a target resident category
//!
//! A facility pairs a host building with its configuration: which category it
//! serves, how many rooms it has, how far it recruits and at what quality.

pub mod occupancy;
pub mod staffing;

pub use occupancy::{first_empty_room, occupancy, Occupancy};
pub use staffing::NumWorkers;

use serde::{Deserialize, Serialize};

use crate::core::config::CapacityConfig;
use crate::core::types::{AgeLimits, BuildingId};
use crate::population::BehaviorType;

/// Resident category a facility serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityKind {
    /// Nursing home: admits seniors
    SeniorCare,
    /// Orphanage: admits children and teens
    ChildCare,
}

impl FacilityKind {
    /// Building behavior the host assigns to facilities of this kind
    pub fn behavior(&self) -> BehaviorType {
        match self {
            FacilityKind::SeniorCare => BehaviorType::SeniorCare,
            FacilityKind::ChildCare => BehaviorType::ChildCare,
        }
    }

    pub fn from_behavior(behavior: BehaviorType) -> Option<Self> {
        match behavior {
            BehaviorType::SeniorCare => Some(FacilityKind::SeniorCare),
            BehaviorType::ChildCare => Some(FacilityKind::ChildCare),
            _ => None,
        }
    }

    /// Age-band test for the category
    ///
    /// Seniors: strictly between the adult and senior limits.
    /// Children: below the teen limit.
    pub fn is_category_age(&self, age: u8, ages: &AgeLimits) -> bool {
        match self {
            FacilityKind::SeniorCare => age > ages.adult && age < ages.senior,
            FacilityKind::ChildCare => age < ages.teen,
        }
    }

    /// Global capacity modifier for this kind
    pub fn modifier(&self, capacity: &CapacityConfig) -> f32 {
        match self {
            FacilityKind::SeniorCare => capacity.senior_care_modifier,
            FacilityKind::ChildCare => capacity.child_care_modifier,
        }
    }
}

impl std::fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacilityKind::SeniorCare => write!(f, "senior care"),
            FacilityKind::ChildCare => write!(f, "child care"),
        }
    }
}

pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 5;

/// Per-facility parameters supplied by the host settings layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilitySettings {
    /// Configured room count before the capacity modifier
    pub room_count: u32,
    /// Recruiting reach, in world units
    pub operation_radius: f32,
    pub quality: u8,
    /// Worker targets per education tier
    pub staffing_targets: [u32; 4],
}

impl Default for FacilitySettings {
    fn default() -> Self {
        Self {
            room_count: 25,
            operation_radius: 500.0,
            quality: 3,
            staffing_targets: [5, 5, 5, 4],
        }
    }
}

/// A facility building and its runtime state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub building: BuildingId,
    pub kind: FacilityKind,
    pub settings: FacilitySettings,
    /// Global capacity scale factor (0 or below means unscaled)
    pub capacity_modifier: f32,
}

impl Facility {
    /// Create a facility; quality outside 1..=5 is clamped
    pub fn new(building: BuildingId, kind: FacilityKind, mut settings: FacilitySettings) -> Self {
        settings.quality = settings.quality.clamp(MIN_QUALITY, MAX_QUALITY);
        Self {
            building,
            kind,
            settings,
            capacity_modifier: 1.0,
        }
    }

    pub fn with_modifier(mut self, modifier: f32) -> Self {
        self.capacity_modifier = modifier;
        self
    }

    pub fn quality(&self) -> u8 {
        self.settings.quality
    }

    /// Room count scaled by the capacity modifier
    pub fn modified_capacity(&self) -> u32 {
        if self.capacity_modifier > 0.0 {
            (self.settings.room_count as f32 * self.capacity_modifier).floor() as u32
        } else {
            self.settings.room_count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_is_clamped() {
        let low = Facility::new(
            BuildingId(1),
            FacilityKind::SeniorCare,
            FacilitySettings { quality: 0, ..Default::default() },
        );
        assert_eq!(low.quality(), 1);

        let high = Facility::new(
            BuildingId(1),
            FacilityKind::ChildCare,
            FacilitySettings { quality: 9, ..Default::default() },
        );
        assert_eq!(high.quality(), 5);
    }

    #[test]
    fn test_modified_capacity() {
        let settings = FacilitySettings { room_count: 10, ..Default::default() };
        let facility = Facility::new(BuildingId(1), FacilityKind::SeniorCare, settings);

        assert_eq!(facility.clone().with_modifier(1.0).modified_capacity(), 10);
        assert_eq!(facility.clone().with_modifier(1.55).modified_capacity(), 15);
        assert_eq!(facility.clone().with_modifier(0.25).modified_capacity(), 2);
        assert_eq!(facility.clone().with_modifier(0.0).modified_capacity(), 10);
        assert_eq!(facility.with_modifier(-2.0).modified_capacity(), 10);
    }

    #[test]
    fn test_category_age_bands() {
        let ages = AgeLimits::default();
        let senior = FacilityKind::SeniorCare;
        assert!(!senior.is_category_age(180, &ages));
        assert!(senior.is_category_age(181, &ages));
        assert!(senior.is_category_age(219, &ages));
        assert!(!senior.is_category_age(220, &ages));

        let child = FacilityKind::ChildCare;
        assert!(child.is_category_age(0, &ages));
        assert!(child.is_category_age(44, &ages));
        assert!(!child.is_category_age(45, &ages));
    }

    #[test]
    fn test_behavior_round_trip() {
        for kind in [FacilityKind::SeniorCare, FacilityKind::ChildCare] {
            assert_eq!(FacilityKind::from_behavior(kind.behavior()), Some(kind));
        }
        assert_eq!(FacilityKind::from_behavior(BehaviorType::Residential), None);
    }
}
