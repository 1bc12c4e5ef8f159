//! Property-based tests for the mechanism model under default settings.

use nhi_config::ModelConfig;
use nhi_core::mechanism::{MechanismModel, Predictability};
use proptest::prelude::*;

fn model() -> MechanismModel {
    MechanismModel::new(ModelConfig::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn blended_cycle_stays_at_target(p in 1u8..=100) {
        let model = model();
        let target = f64::from(model.config().cycle.cycle_weeks);
        let (profile, calibration) = model.profile(Predictability::new(p).unwrap());
        prop_assert!(calibration.converged);
        prop_assert!(
            (profile.expected_cycle_length - target).abs() < 0.05,
            "p={p} length={}", profile.expected_cycle_length
        );
    }

    #[test]
    fn time_share_is_a_distribution(p in 0u8..=100) {
        let (profile, _) = model().profile(Predictability::new(p).unwrap());
        let sum: f64 = profile.time_share.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
        prop_assert!(profile.hazard.iter().all(|h| (0.0..=0.999).contains(h)));
    }

    #[test]
    fn average_effort_is_bounded_by_schedule(p in 0u8..=100) {
        let (profile, _) = model().profile(Predictability::new(p).unwrap());
        let lo = profile.effort.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = profile.effort.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(profile.average_effort >= lo - 1e-12);
        prop_assert!(profile.average_effort <= hi + 1e-12);
    }

    #[test]
    fn evaluation_is_deterministic(p in 0u8..=100) {
        let p = Predictability::new(p).unwrap();
        let a = model().evaluate(p);
        let b = model().evaluate(p);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn ui_scale_round_trips(v in 0u8..=100) {
        let p = Predictability::from_ui_scale(v).unwrap();
        prop_assert_eq!(p.ui_scale(), v);
        prop_assert_eq!(p.value(), 100 - v);
    }
}
