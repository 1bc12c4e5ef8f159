//! Small helpers over week-indexed series.

/// Standard logistic function `1 / (1 + exp(-z))`.
pub fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Weighted average of `values` under `weights`.
///
/// Pairs entries up to the shorter of the two slices. Returns NaN when the
/// paired weights do not sum to a positive value.
pub fn weighted_average(values: &[f64], weights: &[f64]) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for (v, w) in values.iter().zip(weights) {
        num += v * w;
        den += w;
    }
    if den <= 0.0 || den.is_nan() {
        return f64::NAN;
    }
    num / den
}

/// Scale `values` to sum to one. A non-positive total yields a uniform vector.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        let u = 1.0 / values.len() as f64;
        return vec![u; values.len()];
    }
    values.iter().map(|v| v / total).collect()
}

/// Pointwise `(1 - weight) * a + weight * b` over the longer of the two
/// slices; missing entries of the shorter slice reuse its last value.
pub fn mix(a: &[f64], b: &[f64], weight: f64) -> Vec<f64> {
    let n = a.len().max(b.len());
    let at = |s: &[f64], i: usize| s.get(i).or(s.last()).copied().unwrap_or(0.0);
    (0..n)
        .map(|i| (1.0 - weight) * at(a, i) + weight * at(b, i))
        .collect()
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`.
///
/// `xs` must be ascending. Outside the range the first or last `y` is
/// returned. Empty or mismatched inputs yield NaN.
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() || x.is_nan() {
        return f64::NAN;
    }
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }
    let hi = xs.partition_point(|v| *v <= x);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span == 0.0 {
        return ys[hi];
    }
    let t = (x - xs[lo]) / span;
    ys[lo] + t * (ys[hi] - ys[lo])
}

/// Linear-interpolated quantile (`q` in `[0, 1]`). NaN for empty input.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() || q.is_nan() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn logistic_midpoint() {
        assert!(approx_eq(logistic(0.0), 0.5, 1e-15));
        assert!(logistic(40.0) > 0.999_999);
        assert!(logistic(-40.0) < 1e-6);
    }

    #[test]
    fn weighted_average_basic() {
        let avg = weighted_average(&[1.0, 3.0], &[0.25, 0.75]);
        assert!(approx_eq(avg, 2.5, 1e-12));
    }

    #[test]
    fn weighted_average_uses_shorter_length() {
        let avg = weighted_average(&[2.0, 2.0, 100.0], &[0.5, 0.5]);
        assert!(approx_eq(avg, 2.0, 1e-12));
    }

    #[test]
    fn weighted_average_zero_weights_is_nan() {
        assert!(weighted_average(&[1.0], &[0.0]).is_nan());
        assert!(weighted_average(&[], &[]).is_nan());
    }

    #[test]
    fn normalize_sums_to_one() {
        let n = normalize(&[1.0, 1.0, 2.0]);
        assert!(approx_eq(n.iter().sum::<f64>(), 1.0, 1e-12));
        assert!(approx_eq(n[2], 0.5, 1e-12));
    }

    #[test]
    fn normalize_zero_is_uniform() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.5, 0.5]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn mix_extends_shorter_input() {
        let m = mix(&[0.0, 1.0, 2.0], &[4.0], 0.5);
        assert_eq!(m, vec![2.0, 2.5, 3.0]);
    }

    #[test]
    fn interp_matches_numpy_semantics() {
        let xs = [0.74, 0.99, 1.24];
        let ys = [10.0, 20.0, 30.0];
        assert_eq!(interp(0.5, &xs, &ys), 10.0);
        assert_eq!(interp(1.5, &xs, &ys), 30.0);
        assert!(approx_eq(interp(0.865, &xs, &ys), 15.0, 1e-9));
        assert_eq!(interp(0.99, &xs, &ys), 20.0);
        assert!(interp(1.0, &[], &[]).is_nan());
    }

    #[test]
    fn quantile_linear() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!(approx_eq(quantile(&v, 0.5), 2.5, 1e-12));
        assert!(quantile(&[], 0.5).is_nan());
    }
}
