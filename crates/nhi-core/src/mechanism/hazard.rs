//! Weekly inspection hazards for each regime.

use nhi_config::{ModelConfig, ScheduledHazard};
use nhi_math::{calibrate_hazard, clamp_probability, logistic, HazardCalibration};

use super::Predictability;

/// Hazard of the fully predictable regime over `horizon` weeks.
///
/// A spike places a certain inspection at one week; a sigmoid ramps the
/// hazard up toward `ceiling` around `midpoint`. Values are clamped to
/// `[0, 1]`.
pub fn scheduled_hazard(model: &ModelConfig) -> Vec<f64> {
    let horizon = model.cycle.horizon;
    match model.hazard.scheduled {
        ScheduledHazard::Spike { .. } => {
            let mut h = vec![0.0; horizon];
            if let Some(slot) = h.get_mut(model.scheduled_week() as usize) {
                *slot = 1.0;
            }
            h
        }
        ScheduledHazard::Sigmoid {
            ceiling,
            steepness,
            midpoint,
        } => (0..horizon)
            .map(|w| clamp_probability(ceiling * logistic(steepness * (w as f64 - midpoint))))
            .collect(),
    }
}

/// Memoryless hazard `1 / cycle_weeks` over `horizon` weeks.
pub fn flat_hazard(cycle_weeks: u32, horizon: usize) -> Vec<f64> {
    vec![1.0 / f64::from(cycle_weeks.max(1)); horizon]
}

/// Hazard at predictability `p`, calibrated to the configured cycle length.
///
/// With `r = p / 100`, the scheduled hazard is kept at weight `1 - r` and
/// the flat hazard at weight `r` is rescaled until the combined hazard has
/// an expected cycle length of `cycle_weeks`. At `p = 0` there is nothing
/// to rescale, so the scheduled hazard is returned (clipped).
pub fn blended_hazard(p: Predictability, model: &ModelConfig) -> HazardCalibration {
    let r = p.random_weight();
    let horizon = model.cycle.horizon;
    let base: Vec<f64> = scheduled_hazard(model)
        .into_iter()
        .map(|h| (1.0 - r) * h)
        .collect();
    let shape: Vec<f64> = flat_hazard(model.cycle.cycle_weeks, horizon)
        .into_iter()
        .map(|h| r * h)
        .collect();
    calibrate_hazard(&base, &shape, f64::from(model.cycle.cycle_weeks), horizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nhi_math::expected_cycle_length_from_hazard;

    fn p(v: u8) -> Predictability {
        Predictability::new(v).unwrap()
    }

    #[test]
    fn spike_sits_at_cycle_week() {
        let model = ModelConfig::default();
        let h = scheduled_hazard(&model);
        assert_eq!(h.len(), 300);
        assert_eq!(h[53], 1.0);
        assert_eq!(h.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn sigmoid_is_increasing_and_bounded() {
        let mut model = ModelConfig::default();
        model.hazard.scheduled = ScheduledHazard::Sigmoid {
            ceiling: 0.15,
            steepness: 0.3,
            midpoint: 45.0,
        };
        let h = scheduled_hazard(&model);
        assert!(h.windows(2).all(|w| w[1] >= w[0]));
        assert!(h.iter().all(|v| *v <= 0.15));
        assert!((h[45] - 0.075).abs() < 1e-12);
    }

    #[test]
    fn random_regime_hits_target() {
        let model = ModelConfig::default();
        let cal = blended_hazard(p(100), &model);
        assert!((cal.expected_length - 53.0).abs() < 0.01);
        assert!(!cal.fallback);
        // Flat everywhere.
        let first = cal.hazard[0];
        assert!(cal.hazard.iter().all(|h| (h - first).abs() < 1e-15));
    }

    #[test]
    fn scheduled_regime_is_the_spike() {
        let model = ModelConfig::default();
        let cal = blended_hazard(p(0), &model);
        assert_eq!(cal.multiplier, 0.0);
        assert_eq!(cal.iterations, 0);
        assert!((cal.hazard[53] - 0.999).abs() < 1e-12);
        assert!(cal.hazard[..53].iter().all(|h| *h == 0.0));
    }

    #[test]
    fn blended_regimes_keep_cycle_length() {
        let model = ModelConfig::default();
        for v in (5..=100).step_by(5) {
            let cal = blended_hazard(p(v), &model);
            let el = expected_cycle_length_from_hazard(&cal.hazard, model.cycle.horizon);
            assert!((el - 53.0).abs() < 0.05, "p={} el={}", v, el);
        }
    }

    #[test]
    fn flat_hazard_guards_zero_cycle() {
        assert_eq!(flat_hazard(0, 3), vec![1.0; 3]);
        assert_eq!(flat_hazard(4, 2), vec![0.25; 2]);
    }
}
