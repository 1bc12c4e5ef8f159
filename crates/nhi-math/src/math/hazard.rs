//! Discrete-time hazard utilities for renewal processes.
//!
//! A hazard sequence `h[w]` is the probability that an inspection happens in
//! week `w` given that none has happened since the last one. Under a renewal
//! assumption (each inspection restarts the clock) the long-run share of time
//! spent at "w weeks since the last inspection" is proportional to the
//! survival function `S[w] = prod_{k<w} (1 - h[k])`.
//!
//! Indices past the end of a hazard slice reuse its last value, so a short
//! slice describes a hazard that is flat from its final week onwards.

use serde::{Deserialize, Serialize};

/// Survival mass below which iteration stops.
pub const SURVIVAL_FLOOR: f64 = 1e-10;

/// Upper clip applied to calibrated hazards.
pub const HAZARD_CEILING: f64 = 0.999;

/// Default number of weeks considered when summing survival.
pub const DEFAULT_HORIZON: usize = 400;

/// Bisection steps used by [`calibrate_hazard`].
pub const CALIBRATION_ITERS: usize = 60;

/// Relative gap between achieved and target length still counted as a hit.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-3;

const MULTIPLIER_UPPER: f64 = 50.0;
const MAX_BRACKET_DOUBLINGS: usize = 40;

/// Clamp a raw value into a valid probability. NaN maps to zero.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// Clip a raw hazard into `[0, HAZARD_CEILING]`. NaN maps to zero.
pub fn clip_hazard(h: f64) -> f64 {
    if h.is_nan() {
        return 0.0;
    }
    h.clamp(0.0, HAZARD_CEILING)
}

/// Hazard at week `w`, extending the slice with its last value.
///
/// An empty slice is a zero hazard.
pub fn hazard_at(h: &[f64], w: usize) -> f64 {
    let raw = match h.get(w) {
        Some(v) => *v,
        None => h.last().copied().unwrap_or(0.0),
    };
    clamp_probability(raw)
}

/// Survival sequence `S[0..]` with `S[0] = 1`.
///
/// Stops once the next survival value would fall below [`SURVIVAL_FLOOR`] or
/// when `horizon` values have been produced.
pub fn survival_from_hazard(h: &[f64], horizon: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(horizon.min(h.len().max(64)));
    let mut s = 1.0;
    for w in 0..horizon {
        out.push(s);
        s *= 1.0 - hazard_at(h, w);
        if s < SURVIVAL_FLOOR {
            break;
        }
    }
    out
}

/// Expected inspection cycle length `E[L] = sum_w S[w]`, in weeks.
pub fn expected_cycle_length_from_hazard(h: &[f64], horizon: usize) -> f64 {
    let mut s = 1.0;
    let mut total = 0.0;
    for w in 0..horizon {
        total += s;
        s *= 1.0 - hazard_at(h, w);
        if s < SURVIVAL_FLOOR {
            break;
        }
    }
    total
}

/// Stationary time-share distribution `pi[w] = S[w] / sum S`.
///
/// The result has one entry per surviving week and sums to one. A zero
/// horizon yields an empty vector.
pub fn time_share_from_hazard(h: &[f64], horizon: usize) -> Vec<f64> {
    let survival = survival_from_hazard(h, horizon);
    let total: f64 = survival.iter().sum();
    if total <= 0.0 {
        return survival;
    }
    survival.into_iter().map(|s| s / total).collect()
}

/// Outcome of calibrating a hazard to a target expected cycle length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardCalibration {
    /// Scalar applied to the shape.
    pub multiplier: f64,
    /// Calibrated hazard, clipped to `[0, HAZARD_CEILING]`.
    pub hazard: Vec<f64>,
    /// Expected cycle length implied by `hazard`.
    pub expected_length: f64,
    /// Bisection steps performed (zero when no search was needed).
    pub iterations: usize,
    /// True when the shape was degenerate and a flat hazard was substituted.
    pub fallback: bool,
    /// True when `expected_length` is within [`CONVERGENCE_TOLERANCE`] of the
    /// target. False when no multiplier can reach it, e.g. a base that is
    /// already shorter or a shape too sparse to shorten the cycle enough.
    pub converged: bool,
}

fn reached(expected_length: f64, target_len: f64) -> bool {
    (expected_length - target_len).abs() <= CONVERGENCE_TOLERANCE * target_len.abs().max(1.0)
}

fn combine(base: &[f64], shape: &[f64], multiplier: f64, out: &mut Vec<f64>) {
    let n = base.len().max(shape.len());
    out.clear();
    out.extend((0..n).map(|i| {
        let b = base.get(i).copied().unwrap_or(0.0);
        let s = shape.get(i).copied().unwrap_or(0.0);
        clip_hazard(b + multiplier * s)
    }));
}

/// Find `m` such that `clip(base + m * shape, 0, HAZARD_CEILING)` has
/// expected cycle length `target_len`.
///
/// Negative and NaN shape entries are treated as zero. A larger multiplier
/// means a larger hazard and therefore a shorter cycle, so the search is a
/// monotone bisection. The upper bound starts at 50 and is doubled until it
/// brackets the target.
///
/// Degenerate cases:
/// - all-zero shape and all-zero base: flat hazard `1 / target_len`
/// - all-zero shape with a non-zero base: the clipped base, `m = 0`
/// - the base alone already yields a cycle no longer than the target: `m = 0`
///
/// Unreachable targets return the closest hazard found with
/// `converged = false` rather than an error.
pub fn calibrate_hazard(
    base: &[f64],
    shape: &[f64],
    target_len: f64,
    horizon: usize,
) -> HazardCalibration {
    let shape: Vec<f64> = shape
        .iter()
        .map(|v| if v.is_nan() { 0.0 } else { v.max(0.0) })
        .collect();
    let shape_is_zero = shape.iter().all(|v| *v == 0.0);
    let base_is_zero = base.iter().all(|v| clip_hazard(*v) == 0.0);

    if shape_is_zero && base_is_zero {
        let n = base.len().max(shape.len()).max(1);
        let hazard = vec![clip_hazard(1.0 / target_len); n];
        let expected_length = expected_cycle_length_from_hazard(&hazard, horizon);
        return HazardCalibration {
            multiplier: 0.0,
            hazard,
            expected_length,
            iterations: 0,
            fallback: true,
            converged: reached(expected_length, target_len),
        };
    }

    let mut buf = Vec::new();
    combine(base, &shape, 0.0, &mut buf);
    let base_length = expected_cycle_length_from_hazard(&buf, horizon);
    if shape_is_zero || base_length <= target_len {
        return HazardCalibration {
            multiplier: 0.0,
            hazard: buf,
            expected_length: base_length,
            iterations: 0,
            fallback: false,
            converged: reached(base_length, target_len),
        };
    }

    let mut lo = 0.0;
    let mut hi = MULTIPLIER_UPPER;
    for _ in 0..MAX_BRACKET_DOUBLINGS {
        combine(base, &shape, hi, &mut buf);
        if expected_cycle_length_from_hazard(&buf, horizon) <= target_len {
            break;
        }
        lo = hi;
        hi *= 2.0;
    }

    for _ in 0..CALIBRATION_ITERS {
        let mid = 0.5 * (lo + hi);
        combine(base, &shape, mid, &mut buf);
        if expected_cycle_length_from_hazard(&buf, horizon) > target_len {
            // hazard too small, cycles too long
            lo = mid;
        } else {
            hi = mid;
        }
    }

    combine(base, &shape, hi, &mut buf);
    let expected_length = expected_cycle_length_from_hazard(&buf, horizon);
    HazardCalibration {
        multiplier: hi,
        hazard: buf,
        expected_length,
        iterations: CALIBRATION_ITERS,
        fallback: false,
        converged: reached(expected_length, target_len),
    }
}

/// Scale a non-negative hazard shape so its expected cycle length is
/// `target_len` weeks. All-zero shapes fall back to a flat `1 / target_len`.
pub fn scale_hazard_to_target_length(shape: &[f64], target_len: f64) -> Vec<f64> {
    calibrate_hazard(&[], shape, target_len, DEFAULT_HORIZON).hazard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn survival_starts_at_one_and_decreases() {
        let s = survival_from_hazard(&[0.1, 0.2, 0.3], 10);
        assert_eq!(s[0], 1.0);
        assert!(approx_eq(s[1], 0.9, 1e-12));
        assert!(approx_eq(s[2], 0.72, 1e-12));
        for pair in s.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn hazard_extends_with_last_value() {
        assert_eq!(hazard_at(&[0.1, 0.4], 7), 0.4);
        assert_eq!(hazard_at(&[], 3), 0.0);
    }

    #[test]
    fn hazard_values_are_clamped() {
        assert_eq!(hazard_at(&[1.5], 0), 1.0);
        assert_eq!(hazard_at(&[-0.2], 0), 0.0);
        assert_eq!(hazard_at(&[f64::NAN], 0), 0.0);
        assert_eq!(clip_hazard(1.0), HAZARD_CEILING);
    }

    #[test]
    fn constant_hazard_is_geometric() {
        let c = 0.05;
        let s = survival_from_hazard(&[c], 100);
        assert_eq!(s.len(), 100);
        for (w, value) in s.iter().enumerate() {
            assert!(approx_eq(*value, (1.0 - c).powi(w as i32), 1e-12));
        }
        let pi = time_share_from_hazard(&[c], 100);
        let ratio = pi[10] / pi[9];
        assert!(approx_eq(ratio, 1.0 - c, 1e-12));
    }

    #[test]
    fn spike_gives_uniform_share() {
        let mut h = vec![0.0; 60];
        h[53] = 1.0;
        let pi = time_share_from_hazard(&h, 300);
        assert_eq!(pi.len(), 54);
        for value in &pi {
            assert!(approx_eq(*value, 1.0 / 54.0, 1e-12));
        }
    }

    #[test]
    fn expected_length_of_flat_hazard() {
        // Geometric mean is 1/c when truncation is negligible.
        let el = expected_cycle_length_from_hazard(&[1.0 / 53.0], 2000);
        assert!(approx_eq(el, 53.0, 1e-6));
    }

    #[test]
    fn expected_length_matches_survival_sum() {
        let h = [0.0, 0.02, 0.05, 0.1];
        let s: f64 = survival_from_hazard(&h, 400).iter().sum();
        assert!(approx_eq(expected_cycle_length_from_hazard(&h, 400), s, 1e-12));
    }

    #[test]
    fn zero_horizon_is_empty() {
        assert!(time_share_from_hazard(&[0.1], 0).is_empty());
        assert_eq!(expected_cycle_length_from_hazard(&[0.1], 0), 0.0);
    }

    #[test]
    fn zero_hazard_runs_to_horizon() {
        let pi = time_share_from_hazard(&[0.0], 50);
        assert_eq!(pi.len(), 50);
        assert!(approx_eq(pi[0], 0.02, 1e-12));
    }

    #[test]
    fn scale_hits_target() {
        let shape: Vec<f64> = (0..80).map(|w| 0.1 + w as f64 * 0.01).collect();
        let h = scale_hazard_to_target_length(&shape, 20.0);
        let el = expected_cycle_length_from_hazard(&h, DEFAULT_HORIZON);
        assert!(approx_eq(el, 20.0, 0.2), "el={el}");
    }

    #[test]
    fn scale_all_zero_falls_back_to_flat() {
        let h = scale_hazard_to_target_length(&[0.0; 10], 40.0);
        assert_eq!(h.len(), 10);
        assert!(h.iter().all(|v| approx_eq(*v, 0.025, 1e-15)));
        let cal = calibrate_hazard(&[], &[0.0, -1.0], 40.0, DEFAULT_HORIZON);
        assert!(cal.fallback);
        assert!(cal.converged);
    }

    #[test]
    fn tiny_shape_needs_bracket_expansion() {
        let shape = vec![1e-6; 10];
        let cal = calibrate_hazard(&[], &shape, 53.0, DEFAULT_HORIZON);
        assert!(cal.multiplier > MULTIPLIER_UPPER);
        assert!(approx_eq(cal.expected_length, 53.0, 0.53));
        assert!(cal.converged);
    }

    #[test]
    fn unreachable_target_is_not_converged() {
        // Four hazard-free weeks put a floor of about 5 weeks on the cycle.
        let cal = calibrate_hazard(&[], &[0.0, 0.0, 0.0, 0.0, 0.01], 2.0, DEFAULT_HORIZON);
        assert!(!cal.converged);
        assert!(!cal.fallback);
        assert!(approx_eq(cal.expected_length, 5.001, 1e-3), "el={}", cal.expected_length);

        let reachable = calibrate_hazard(&[], &[0.0, 0.0, 0.0, 0.0, 0.01], 8.0, DEFAULT_HORIZON);
        assert!(reachable.converged);
    }

    #[test]
    fn base_long_enough_keeps_multiplier_zero() {
        let mut base = vec![0.0; 60];
        base[10] = 1.0;
        let cal = calibrate_hazard(&base, &[0.01; 60], 53.0, DEFAULT_HORIZON);
        assert_eq!(cal.multiplier, 0.0);
        assert_eq!(cal.iterations, 0);
        assert!(cal.expected_length < 53.0);
        assert!(!cal.converged);
    }

    #[test]
    fn calibration_is_deterministic() {
        let shape = [0.2, 0.4, 0.8, 0.1];
        let a = calibrate_hazard(&[], &shape, 12.0, DEFAULT_HORIZON);
        let b = calibrate_hazard(&[], &shape, 12.0, DEFAULT_HORIZON);
        assert_eq!(a, b);
    }
}
