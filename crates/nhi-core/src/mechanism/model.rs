//! Mechanism evaluation: hazard → time share → average effort.

use nhi_config::ModelConfig;
use nhi_math::{mix, time_share_from_hazard, weighted_average, HazardCalibration};
use serde::{Deserialize, Serialize};

use super::{blended_hazard, effort_curve, Predictability, Regime};

/// Week-indexed series and summary statistics for one regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeProfile {
    /// Calibrated weekly hazard, clipped to `[0, 0.999]`.
    pub hazard: Vec<f64>,
    /// Stationary share of time spent at each week since inspection.
    pub time_share: Vec<f64>,
    /// Effort at each week since inspection.
    pub effort: Vec<f64>,
    /// Expected weeks between inspections (`sum S`).
    pub expected_cycle_length: f64,
    /// Time-share weighted effort.
    pub average_effort: f64,
    /// Share of time inside the post-inspection revisit window.
    pub revisit_time_share: f64,
}

impl RegimeProfile {
    /// Truncate every series to the first `weeks` entries.
    pub fn truncated(&self, weeks: usize) -> RegimeProfile {
        let cut = |v: &Vec<f64>| v[..weeks.min(v.len())].to_vec();
        RegimeProfile {
            hazard: cut(&self.hazard),
            time_share: cut(&self.time_share),
            effort: cut(&self.effort),
            ..self.clone()
        }
    }
}

/// Result of evaluating the mechanism at one predictability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismOutcome {
    pub predictability: Predictability,
    pub regime: Regime,
    /// Multiplier applied to the flat component during calibration.
    pub calibration_multiplier: f64,
    /// True when a degenerate hazard forced the flat fallback.
    pub calibration_fallback: bool,
    /// False when no multiplier reaches `cycle_weeks`, as for the pure
    /// scheduled regime whose spike alone fixes the cycle.
    pub calibration_converged: bool,
    /// Post-inspection revisit window, in weeks.
    pub revisit_weeks: u32,
    /// The requested regime.
    pub profile: RegimeProfile,
    /// The fully random regime, for comparison.
    pub benchmark: RegimeProfile,
    /// `(benchmark - average) / average * 100`; None when the average is zero.
    pub effort_gain_percent: Option<f64>,
}

impl MechanismOutcome {
    /// Copy with every series truncated to `weeks` entries.
    pub fn truncated(&self, weeks: usize) -> MechanismOutcome {
        MechanismOutcome {
            profile: self.profile.truncated(weeks),
            benchmark: self.benchmark.truncated(weeks),
            ..self.clone()
        }
    }
}

/// Evaluates regimes under a fixed model configuration.
#[derive(Debug, Clone)]
pub struct MechanismModel {
    config: ModelConfig,
}

impl MechanismModel {
    pub fn new(config: ModelConfig) -> Self {
        MechanismModel { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Calibrated hazard at predictability `p`.
    pub fn calibrate(&self, p: Predictability) -> HazardCalibration {
        blended_hazard(p, &self.config)
    }

    /// Effort schedule at predictability `p` given that regime's hazard.
    ///
    /// `e = (1 - r) * e_scheduled + r * e_unpredictable` with `r = p / 100`.
    pub fn effort(&self, p: Predictability, hazard: &[f64]) -> Vec<f64> {
        let cycle = &self.config.cycle;
        let effort = &self.config.effort;
        let scheduled = effort_curve(&effort.scheduled, cycle.horizon, cycle.cycle_weeks, hazard);
        let unpredictable =
            effort_curve(&effort.unpredictable, cycle.horizon, cycle.cycle_weeks, hazard);
        mix(&scheduled, &unpredictable, p.random_weight())
    }

    /// Profile of a single regime.
    pub fn profile(&self, p: Predictability) -> (RegimeProfile, HazardCalibration) {
        let calibration = self.calibrate(p);
        let time_share = time_share_from_hazard(&calibration.hazard, self.config.cycle.horizon);
        let effort = self.effort(p, &calibration.hazard);
        let average_effort = weighted_average(&effort, &time_share);
        let revisit = self.config.cycle.revisit_weeks as usize;
        let revisit_time_share = time_share.iter().take(revisit + 1).sum();

        let profile = RegimeProfile {
            hazard: calibration.hazard.clone(),
            time_share,
            effort,
            expected_cycle_length: calibration.expected_length,
            average_effort,
            revisit_time_share,
        };
        (profile, calibration)
    }

    /// Evaluate predictability `p` against the fully random benchmark.
    pub fn evaluate(&self, p: Predictability) -> MechanismOutcome {
        let (profile, calibration) = self.profile(p);
        let benchmark = if p == Predictability::RANDOM {
            profile.clone()
        } else {
            self.profile(Predictability::RANDOM).0
        };

        let effort_gain_percent = if profile.average_effort != 0.0
            && profile.average_effort.is_finite()
        {
            Some((benchmark.average_effort - profile.average_effort) / profile.average_effort * 100.0)
        } else {
            None
        };

        MechanismOutcome {
            predictability: p,
            regime: p.regime(),
            calibration_multiplier: calibration.multiplier,
            calibration_fallback: calibration.fallback,
            calibration_converged: calibration.converged,
            revisit_weeks: self.config.cycle.revisit_weeks,
            profile,
            benchmark,
            effort_gain_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nhi_config::EffortCurve;

    fn model() -> MechanismModel {
        MechanismModel::new(ModelConfig::default())
    }

    fn p(v: u8) -> Predictability {
        Predictability::new(v).unwrap()
    }

    #[test]
    fn time_share_sums_to_one() {
        for v in [0, 30, 50, 80, 100] {
            let outcome = model().evaluate(p(v));
            let total: f64 = outcome.profile.time_share.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "p={} total={}", v, total);
        }
    }

    #[test]
    fn scheduled_time_share_is_near_uniform() {
        let outcome = model().evaluate(Predictability::SCHEDULED);
        let pi = &outcome.profile.time_share;
        // 54 weeks carry nearly all the mass, evenly.
        let head: f64 = pi[..54].iter().sum();
        assert!(head > 0.99);
        assert!((pi[0] - pi[53]).abs() < 1e-12);
        assert!(pi[54] < 1e-4);
    }

    #[test]
    fn randomness_raises_average_effort() {
        let scheduled = model().evaluate(Predictability::SCHEDULED);
        let current = model().evaluate(Predictability::CURRENT);
        let random = model().evaluate(Predictability::RANDOM);

        assert!(scheduled.profile.average_effort < current.profile.average_effort);
        assert!(current.profile.average_effort < random.profile.average_effort);
        assert!((random.profile.average_effort - 0.05).abs() < 1e-12);
        assert!(scheduled.effort_gain_percent.unwrap() > 0.0);
        assert!(random.effort_gain_percent.unwrap().abs() < 1e-12);
    }

    #[test]
    fn benchmark_is_the_random_profile() {
        let outcome = model().evaluate(p(20));
        let random = model().evaluate(Predictability::RANDOM);
        assert_eq!(outcome.benchmark, random.profile);
    }

    #[test]
    fn zero_average_has_no_gain() {
        let mut config = ModelConfig::default();
        config.effort.scheduled = EffortCurve::Flat { level: 0.0 };
        let outcome = MechanismModel::new(config).evaluate(Predictability::SCHEDULED);
        assert_eq!(outcome.profile.average_effort, 0.0);
        assert_eq!(outcome.effort_gain_percent, None);
    }

    #[test]
    fn revisit_share_is_a_prefix_sum() {
        let outcome = model().evaluate(Predictability::SCHEDULED);
        // 21 of 54 near-uniform weeks.
        assert!((outcome.profile.revisit_time_share - 21.0 / 54.0).abs() < 0.01);
    }

    #[test]
    fn truncation_limits_series_only() {
        let outcome = model().evaluate(p(50)).truncated(61);
        assert_eq!(outcome.profile.hazard.len(), 61);
        assert_eq!(outcome.benchmark.effort.len(), 61);
        assert!((outcome.profile.expected_cycle_length - 53.0).abs() < 0.05);
    }

    #[test]
    fn evaluation_is_deterministic() {
        assert_eq!(model().evaluate(p(37)), model().evaluate(p(37)));
    }

    #[test]
    fn scheduled_extreme_cannot_calibrate() {
        let model = model();
        assert!(!model.evaluate(p(0)).calibration_converged);
        assert!(model.evaluate(p(50)).calibration_converged);
        assert!(model.evaluate(p(100)).calibration_converged);
    }
}
