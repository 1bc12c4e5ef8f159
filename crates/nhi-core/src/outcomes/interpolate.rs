//! Outcome interpolation between table scenarios.
//!
//! Each anchor regime is first interpolated across frequency (clamped at the
//! ends, snapping to the baseline row near the current frequency), then the
//! three anchor values are joined piecewise-linearly in predictability.

use nhi_math::interp;
use serde::{Deserialize, Serialize};

use super::scenario::{baseline_frequency, Metric};
use super::table::OutcomeTable;
use super::OutcomeError;
use crate::mechanism::{Predictability, Regime};

/// Value of a metric at one anchor regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorValue {
    pub regime: Regime,
    pub value: f64,
    /// True when the frequency snapped to the regime's baseline row.
    pub snapped: bool,
}

/// Interpolated metric value with its anchor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub metric: Metric,
    pub predictability: Predictability,
    pub frequency: f64,
    pub value: f64,
    pub anchors: [AnchorValue; 3],
}

/// Interpolate `metric` at `(p, frequency)`.
pub fn interpolate(
    table: &OutcomeTable,
    frequency: f64,
    p: Predictability,
    metric: Metric,
) -> Result<Interpolation, OutcomeError> {
    let [scheduled, current, unpredictable] = Regime::ALL;
    let anchors = [
        anchor_value(table, scheduled, frequency, metric)?,
        anchor_value(table, current, frequency, metric)?,
        anchor_value(table, unpredictable, frequency, metric)?,
    ];
    let [v0, v50, v100] = anchors.map(|a| a.value);

    let x = f64::from(p.value());
    let value = if x <= 50.0 {
        v0 + (x / 50.0) * (v50 - v0)
    } else {
        v50 + ((x - 50.0) / 50.0) * (v100 - v50)
    };

    Ok(Interpolation {
        metric,
        predictability: p,
        frequency,
        value,
        anchors,
    })
}

fn anchor_value(
    table: &OutcomeTable,
    regime: Regime,
    frequency: f64,
    metric: Metric,
) -> Result<AnchorValue, OutcomeError> {
    let p = regime.anchor();
    let facilities = table.params().facilities;
    let rows: Vec<_> = table.rows_for(p).collect();
    if rows.is_empty() {
        return Err(OutcomeError::InvalidTiers {
            predictability: p.value(),
            count: 0,
        });
    }

    let baseline = baseline_frequency(regime);
    if (frequency - baseline).abs() < table.params().baseline_snap_tolerance {
        let nearest = rows
            .iter()
            .min_by(|a, b| {
                (a.frequency - baseline)
                    .abs()
                    .total_cmp(&(b.frequency - baseline).abs())
            })
            .map(|r| r.value(metric, facilities))
            .unwrap_or(f64::NAN);
        return Ok(AnchorValue {
            regime,
            value: nearest,
            snapped: true,
        });
    }

    let xs: Vec<f64> = rows.iter().map(|r| r.frequency).collect();
    let ys: Vec<f64> = rows.iter().map(|r| r.value(metric, facilities)).collect();
    Ok(AnchorValue {
        regime,
        value: interp(frequency, &xs, &ys),
        snapped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcomes::table::tests::table;

    fn p(v: u8) -> Predictability {
        Predictability::new(v).unwrap()
    }

    #[test]
    fn reproduces_rows_at_anchor_points() {
        let table = table();
        let at = |pv, f| interpolate(&table, f, p(pv), Metric::LivesSaved).unwrap().value;
        assert!((at(50, 0.99) - 334.5).abs() < 1e-9);
        assert!((at(0, 0.735) - 210.4).abs() < 1e-9);
        assert!((at(100, 1.2375) - 455.0).abs() < 1e-9);
    }

    #[test]
    fn snaps_near_baseline() {
        let table = table();
        let result = interpolate(&table, 0.975, p(50), Metric::Efficiency).unwrap();
        assert!(result.anchors.iter().all(|a| a.snapped));
        // Current regime baseline row.
        assert!((result.value - 21.6).abs() < 1e-9);
        // Scheduled snaps to its 0.98 row, not interpolated.
        assert!((result.anchors[0].value - 17.2).abs() < 1e-9);
    }

    #[test]
    fn interpolates_across_frequency_and_predictability() {
        let table = table();
        let result = interpolate(&table, 1.1, p(75), Metric::Information).unwrap();
        assert!(result.anchors.iter().all(|a| !a.snapped));

        let v50 = interp(1.1, &[0.7425, 0.99, 1.2375], &[68.4, 78.9, 85.6]);
        let v100 = interp(1.1, &[0.7425, 0.99, 1.2375], &[73.7, 83.4, 89.2]);
        assert!((result.value - (v50 + 0.5 * (v100 - v50))).abs() < 1e-9);
    }

    #[test]
    fn clamps_outside_frequency_range() {
        let table = table();
        let low = interpolate(&table, 0.1, p(0), Metric::LivesSaved).unwrap();
        assert!((low.value - 210.4).abs() < 1e-9);
        let high = interpolate(&table, 5.0, p(100), Metric::LivesSaved).unwrap();
        assert!((high.value - 455.0).abs() < 1e-9);
    }

    #[test]
    fn total_inspections_interpolate_from_frequency() {
        let table = table();
        let result = interpolate(&table, 0.99, p(50), Metric::TotalInspections).unwrap();
        assert_eq!(result.value, 15_458.0);
    }
}
