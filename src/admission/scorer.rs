//! Weighted admission scoring
//!
//! A household's score is the sum of five factors: age fit, distance fit,
//! family fit, quality/wealth fit and staffing adequacy. A single uniform draw
//! in `[0, draw_ceiling)` then decides admission: the household moves in when
//! the draw does not exceed the score.

use serde::Serialize;

use crate::admission::quality::quality_fraction;
use crate::core::config::ScoringConfig;
use crate::core::types::{AgeLimits, FamilySlots, Wealth};
use crate::facility::{Facility, FacilityKind, NumWorkers};
use crate::population::{Person, PopulationIndex};
use crate::rng::RandomSource;

/// The five scoring factors for one household and facility
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub age: f32,
    pub distance: f32,
    pub family: f32,
    pub quality: f32,
    pub staffing: f32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.age + self.distance + self.family + self.quality + self.staffing
    }
}

/// Scores candidate households against a facility
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionScorer {
    scoring: ScoringConfig,
    ages: AgeLimits,
}

impl AdmissionScorer {
    pub fn new(scoring: ScoringConfig, ages: AgeLimits) -> Self {
        Self { scoring, ages }
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Decide whether `family` moves into `facility`
    ///
    /// A total at or below zero is rejected without consuming a random draw.
    pub fn should_admit<I: PopulationIndex + ?Sized, R: RandomSource>(
        &self,
        family: &FamilySlots,
        facility: &Facility,
        index: &I,
        rng: &mut R,
        staffing: &NumWorkers,
    ) -> bool {
        let breakdown = self.score(family, facility, index, staffing);
        let total = breakdown.total();
        if total <= 0.0 {
            tracing::debug!("No chance for {:?}: {:.1} ({:?})", family, total, breakdown);
            return false;
        }

        let draw = rng.random_uint(self.scoring.draw_ceiling);
        let admit = draw as f32 <= total;
        tracing::debug!(
            "Admission score {:.1} ({:?}), draw {} -> {}",
            total,
            breakdown,
            draw,
            admit
        );
        admit
    }

    /// Compute every factor for `family` against `facility`
    pub fn score<I: PopulationIndex + ?Sized>(
        &self,
        family: &FamilySlots,
        facility: &Facility,
        index: &I,
        staffing: &NumWorkers,
    ) -> ScoreBreakdown {
        let members: Vec<Person> = family
            .iter()
            .filter(|p| p.is_some())
            .filter_map(|&p| index.person(p))
            .collect();

        ScoreBreakdown {
            age: self.age_factor(facility.kind, &members),
            distance: self.distance_factor(family, facility, index),
            family: self.family_factor(facility.kind, &members),
            quality: self.quality_factor(facility.quality(), &members),
            staffing: self.staffing_factor(staffing),
        }
    }

    /// Linear ramp of the category members' mean age, clamped to `[0, age_max]`
    ///
    /// Senior care ramps up from 15 below the adult limit over the width of
    /// the senior band; child care ramps from 0 to the teen limit.
    pub fn age_factor(&self, kind: FacilityKind, members: &[Person]) -> f32 {
        let in_category: Vec<f32> = members
            .iter()
            .filter(|p| p.is_alive() && kind.is_category_age(p.age, &self.ages))
            .map(|p| p.age as f32)
            .collect();
        if in_category.is_empty() {
            return 0.0;
        }
        let mean = in_category.iter().sum::<f32>() / in_category.len() as f32;

        let (start, width) = match kind {
            FacilityKind::SeniorCare => (
                self.ages.adult as f32 - 15.0,
                self.ages.senior.saturating_sub(self.ages.adult).max(1) as f32,
            ),
            FacilityKind::ChildCare => (0.0, self.ages.teen.max(1) as f32),
        };
        ((mean - start) / width * self.scoring.age_max).clamp(0.0, self.scoring.age_max)
    }

    /// Falloff from `distance_max` at the facility to zero at the operation radius
    ///
    /// Bottoms out at twice the maximum below zero. A family without a home
    /// building gets the never sentinel.
    pub fn distance_factor<I: PopulationIndex + ?Sized>(
        &self,
        family: &FamilySlots,
        facility: &Facility,
        index: &I,
    ) -> f32 {
        let floor = -2.0 * self.scoring.distance_max;
        let home = family
            .iter()
            .find(|p| p.is_some())
            .and_then(|&p| index.person(p))
            .and_then(|person| index.building(person.home_building));
        let (Some(home), Some(site)) = (home, index.building(facility.building)) else {
            return self.scoring.never();
        };

        let radius = facility.settings.operation_radius;
        if radius <= 0.0 {
            return floor;
        }
        let distance = site.position.distance(&home.position);
        let value = (radius - distance) / radius * self.scoring.distance_max;
        value.max(floor)
    }

    /// Household composition fit
    pub fn family_factor(&self, kind: FacilityKind, members: &[Person]) -> f32 {
        let max = self.scoring.family_max;
        let ages = &self.ages;
        match kind {
            FacilityKind::SeniorCare => {
                let has_children = members.iter().any(|p| p.age < ages.teen);
                let has_adults = members
                    .iter()
                    .any(|p| p.age >= ages.teen && p.age < ages.adult);
                let seniors = members.iter().filter(|p| p.age >= ages.adult).count();

                // Children are never left without an adult
                if has_children && !has_adults {
                    return self.scoring.never();
                }
                let mut value = max;
                if has_adults {
                    value -= max * 0.75;
                }
                if seniors > 1 {
                    value -= max * 0.25;
                }
                value
            }
            FacilityKind::ChildCare => {
                let has_adults = members
                    .iter()
                    .any(|p| p.age > ages.teen && p.age < ages.adult);
                let has_seniors = members.iter().any(|p| p.age > ages.adult);
                let penalty = match (has_adults, has_seniors) {
                    (true, true) => 0.95,
                    (true, false) => 0.85,
                    (false, true) => 0.45,
                    (false, false) => 1.0,
                };
                max - max * penalty
            }
        }
    }

    /// Quality tier against the household's rounded mean wealth
    pub fn quality_factor(&self, quality: u8, members: &[Person]) -> f32 {
        quality_fraction(quality, self.household_wealth(members)) * self.scoring.quality_max
    }

    /// Rounded mean wealth of members older than the young limit
    ///
    /// Households with no such member count as low wealth.
    pub fn household_wealth(&self, members: &[Person]) -> Wealth {
        let counted: Vec<u32> = members
            .iter()
            .filter(|p| p.age > self.ages.young)
            .map(|p| p.wealth.ordinal())
            .collect();
        if counted.is_empty() {
            return Wealth::Low;
        }
        let mean = counted.iter().sum::<u32>() as f64 / counted.len() as f64;
        Wealth::from_ordinal(mean.round() as u32)
    }

    /// `staffing_max` less a weighted share for every understaffed tier
    pub fn staffing_factor(&self, staffing: &NumWorkers) -> f32 {
        let max = self.scoring.staffing_max;
        self.scoring
            .staffing_tier_weights
            .iter()
            .enumerate()
            .fold(max, |value, (tier, weight)| {
                value - staffing.unmet_fraction(tier) * weight * max
            })
    }
}
