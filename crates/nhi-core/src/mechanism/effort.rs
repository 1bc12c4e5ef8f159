//! Stylized effort curves over weeks since the last inspection.
//!
//! These are illustrative shapes, not estimates. Only their ordering
//! matters: predictable timing concentrates effort just before the expected
//! inspection, random timing spreads it evenly.

use nhi_config::EffortCurve;
use nhi_math::{hazard_at, logistic};

/// Evaluate `curve` for weeks `0..weeks`.
///
/// `cycle_weeks` anchors the logistic ramp; `hazard` feeds the
/// hazard-linked curve and is extended with its last value.
pub fn effort_curve(curve: &EffortCurve, weeks: usize, cycle_weeks: u32, hazard: &[f64]) -> Vec<f64> {
    (0..weeks)
        .map(|w| effort_at(curve, w, cycle_weeks, hazard))
        .collect()
}

fn effort_at(curve: &EffortCurve, w: usize, cycle_weeks: u32, hazard: &[f64]) -> f64 {
    let x = w as f64;
    match *curve {
        EffortCurve::LogisticRamp {
            low,
            high,
            lead_weeks,
            width,
        } => {
            let center = f64::from(cycle_weeks) - lead_weeks;
            low + (high - low) * logistic((x - center) / width)
        }
        EffortCurve::Flat { level } => level,
        EffortCurve::QuadraticBowl {
            baseline,
            amplitude,
            midpoint,
        } => {
            let d = (x - midpoint) / midpoint;
            baseline + amplitude * (2.0 * d * d - 1.0)
        }
        EffortCurve::HazardLinked { floor, slope } => floor + slope * hazard_at(hazard, w),
    }
}
