//! Property tests for admission scoring
//!
//! These tests verify:
//! - Moving a household closer never lowers its distance factor
//! - Adding staff never lowers the staffing factor
//! - Households that can never be admitted are rejected on every draw

use care_homes::admission::AdmissionScorer;
use care_homes::core::config::ScoringConfig;
use care_homes::core::types::{AgeLimits, FamilySlots, PersonId, Vec3, Wealth};
use care_homes::facility::{Facility, FacilityKind, FacilitySettings, NumWorkers};
use care_homes::population::{BehaviorType, CityArena};
use care_homes::rng::SimRng;
use proptest::prelude::*;

fn scorer() -> AdmissionScorer {
    AdmissionScorer::new(ScoringConfig::default(), AgeLimits::default())
}

/// A senior-care site at the origin and one resident household at `offset`
fn city_with_household(offset: f32, ages: &[u8]) -> (CityArena, Facility, FamilySlots) {
    let mut city = CityArena::new(16);
    let site = city.spawn_building(BehaviorType::SeniorCare, Vec3::default(), 0);
    let house = city.spawn_building(BehaviorType::Residential, Vec3::new(offset, 0.0, 0.0), 1);

    let mut family = [PersonId::NONE; 5];
    for (slot, &age) in ages.iter().enumerate().take(5) {
        let person = city.spawn_person(age, Wealth::Medium);
        city.move_in(person, house).unwrap();
        family[slot] = person;
    }
    let facility = Facility::new(site, FacilityKind::SeniorCare, FacilitySettings::default());
    (city, facility, family)
}

proptest! {
    #[test]
    fn prop_distance_factor_is_monotonic(
        near in 0.0f32..2000.0,
        extra in 0.0f32..2000.0,
        radius in 1.0f32..1000.0,
    ) {
        let scorer = scorer();
        let settings = FacilitySettings {
            operation_radius: radius,
            ..Default::default()
        };

        let (city_near, facility, family_near) = city_with_household(near, &[200]);
        let facility = Facility::new(facility.building, facility.kind, settings.clone());
        let (city_far, _, family_far) = city_with_household(near + extra, &[200]);

        let closer = scorer.distance_factor(&family_near, &facility, &city_near);
        let farther = scorer.distance_factor(&family_far, &facility, &city_far);
        prop_assert!(closer >= farther, "{} at {} < {} at {}", closer, near, farther, near + extra);
        prop_assert!(farther >= -2.0 * scorer.scoring().distance_max);
    }

    #[test]
    fn prop_staffing_factor_is_monotonic(
        targets in prop::array::uniform4(0u32..20),
        realized in prop::array::uniform4(0u32..25),
        tier in 0usize..4,
        hired in 1u32..10,
    ) {
        let scorer = scorer();
        let before = NumWorkers::new(targets, realized);
        let mut more = realized;
        more[tier] += hired;
        let after = NumWorkers::new(targets, more);

        prop_assert!(scorer.staffing_factor(&after) >= scorer.staffing_factor(&before));
        prop_assert!(scorer.staffing_factor(&before) <= scorer.scoring().staffing_max + f32::EPSILON);
    }

    #[test]
    fn prop_unaccompanied_children_are_never_admitted(seed in any::<u64>(), child_age in 0u8..45) {
        let scorer = scorer();
        let (city, facility, family) = city_with_household(0.0, &[child_age, 200]);
        let staffing = NumWorkers::fully_staffed(facility.settings.staffing_targets);
        let mut rng = SimRng::from_seed_u64(seed);

        for _ in 0..1000 {
            prop_assert!(!scorer.should_admit(&family, &facility, &city, &mut rng, &staffing));
        }
    }
}

#[test]
fn test_homeless_family_is_never_admitted() {
    let scorer = scorer();
    let mut city = CityArena::new(16);
    let site = city.spawn_building(BehaviorType::SeniorCare, Vec3::default(), 0);
    let drifter = city.spawn_person(200, Wealth::High);
    let facility = Facility::new(site, FacilityKind::SeniorCare, FacilitySettings::default());
    let family = [drifter, PersonId::NONE, PersonId::NONE, PersonId::NONE, PersonId::NONE];

    let staffing = NumWorkers::fully_staffed(facility.settings.staffing_targets);
    let mut rng = SimRng::from_seed_u64(7);
    let breakdown = scorer.score(&family, &facility, &city, &staffing);
    assert_eq!(breakdown.distance, scorer.scoring().never());
    assert!((0..1000).all(|_| !scorer.should_admit(&family, &facility, &city, &mut rng, &staffing)));
}

#[test]
fn test_understaffed_site_scores_lower() {
    let scorer = scorer();
    let (city, facility, family) = city_with_household(100.0, &[200]);
    let full = NumWorkers::fully_staffed(facility.settings.staffing_targets);
    let empty = NumWorkers::new(facility.settings.staffing_targets, [0; 4]);

    let staffed = scorer.score(&family, &facility, &city, &full);
    let unstaffed = scorer.score(&family, &facility, &city, &empty);
    assert_eq!(staffed.staffing, 100.0);
    assert!(unstaffed.staffing.abs() < 1e-3);
    assert!(staffed.total() > unstaffed.total());
}
