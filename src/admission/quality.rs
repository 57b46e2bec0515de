//! Facility quality versus household wealth

use crate::core::types::Wealth;
use crate::facility::{MAX_QUALITY, MIN_QUALITY};

/// Fraction of the quality maximum, rows by quality tier 1..=5
///
/// Columns: low, medium, high wealth.
const QUALITY_WEALTH_TABLE: [[f32; 3]; 5] = [
    [1.0, -0.25, -2.0],
    [0.5, 0.5, -1.0],
    [0.2, 1.0, 0.2],
    [-1.0, 0.5, 0.5],
    [-2.0, 0.0, 1.0],
];

/// Table entry for a quality tier and household wealth
///
/// Tiers outside 1..=5 are clamped.
pub fn quality_fraction(quality: u8, wealth: Wealth) -> f32 {
    let row = quality.clamp(MIN_QUALITY, MAX_QUALITY) - MIN_QUALITY;
    QUALITY_WEALTH_TABLE[row as usize][wealth.ordinal() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_corners() {
        assert_eq!(quality_fraction(1, Wealth::Low), 1.0);
        assert_eq!(quality_fraction(1, Wealth::High), -2.0);
        assert_eq!(quality_fraction(3, Wealth::Medium), 1.0);
        assert_eq!(quality_fraction(5, Wealth::Medium), 0.0);
        assert_eq!(quality_fraction(5, Wealth::High), 1.0);
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        assert_eq!(quality_fraction(0, Wealth::Low), quality_fraction(1, Wealth::Low));
        assert_eq!(quality_fraction(7, Wealth::Low), quality_fraction(5, Wealth::Low));
    }

    #[test]
    fn test_each_wealth_has_a_best_tier() {
        // Every wealth level is fully welcome somewhere
        for wealth in [Wealth::Low, Wealth::Medium, Wealth::High] {
            let best = (1..=5)
                .map(|q| quality_fraction(q, wealth))
                .fold(f32::MIN, f32::max);
            assert_eq!(best, 1.0);
        }
    }
}
