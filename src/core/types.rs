//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation frame counter (monotonic, wraps like the host's)
pub type FrameIndex = u32;

/// Handle to a person record in the host population store (0 = none)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub u32);

impl PersonId {
    pub const NONE: PersonId = PersonId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn is_some(&self) -> bool {
        self.0 != 0
    }
}

/// Handle to a household (room/unit) record in the host store (0 = none)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HouseholdRef(pub u32);

impl HouseholdRef {
    pub const NONE: HouseholdRef = HouseholdRef(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn is_some(&self) -> bool {
        self.0 != 0
    }
}

/// Address of a building in the host building store (0 = none)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u16);

impl BuildingId {
    pub const NONE: BuildingId = BuildingId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One household's five occupant slots
pub type FamilySlots = [PersonId; 5];

/// 3D world position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

/// Age thresholds in the host's age units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeLimits {
    pub child: u8,
    pub teen: u8,
    pub young: u8,
    pub adult: u8,
    /// Upper bound of the senior-care band (exclusive)
    pub senior: u8,
}

impl Default for AgeLimits {
    fn default() -> Self {
        Self {
            child: 15,
            teen: 45,
            young: 90,
            adult: 180,
            senior: 220,
        }
    }
}

/// Wealth ordinal of a person
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Wealth {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Wealth {
    /// Map a rounded ordinal back to a wealth level, saturating at `High`
    pub fn from_ordinal(value: u32) -> Self {
        match value {
            0 => Wealth::Low,
            1 => Wealth::Medium,
            _ => Wealth::High,
        }
    }

    pub fn ordinal(&self) -> u32 {
        *self as u32
    }
}
