//! Outcome table loading and lookup.

use std::io::Read;
use std::path::Path;

use nhi_config::OutcomeParams;
use serde::{Deserialize, Serialize};

use super::scenario::{
    chart_inspections, scenario_label, total_inspections, FrequencyTier, Metric, Scenario,
};
use super::OutcomeError;
use crate::mechanism::{Predictability, Regime};

/// CSV record as written by the simulation pipeline. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    predictability_numeric: f64,
    frequency: f64,
    lives_saved_annually: f64,
    lives_saved_per_1000: f64,
    info_percent: f64,
}

/// Outcomes of one (predictability × frequency) scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub predictability: Predictability,
    pub frequency: f64,
    pub lives_saved_annually: f64,
    pub lives_saved_per_1000: f64,
    pub info_percent: f64,
}

impl OutcomeRow {
    pub fn regime(&self) -> Regime {
        self.predictability.regime()
    }

    /// Value of `metric` for this row.
    pub fn value(&self, metric: Metric, facilities: u32) -> f64 {
        match metric {
            Metric::LivesSaved => self.lives_saved_annually,
            Metric::Efficiency => self.lives_saved_per_1000,
            Metric::Information => self.info_percent,
            Metric::TotalInspections => total_inspections(self.frequency, facilities) as f64,
        }
    }

    fn from_raw(raw: RawRow, row: usize) -> Result<Self, OutcomeError> {
        let invalid = |message: String| OutcomeError::InvalidRow { row, message };

        let values = [
            ("frequency", raw.frequency),
            ("lives_saved_annually", raw.lives_saved_annually),
            ("lives_saved_per_1000", raw.lives_saved_per_1000),
            ("info_percent", raw.info_percent),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{} is not a finite number", name)));
        }

        let p = raw.predictability_numeric;
        if p.fract() != 0.0 || !(0.0..=100.0).contains(&p) {
            return Err(invalid(format!("predictability_numeric {} is not in 0..=100", p)));
        }
        let predictability =
            Predictability::new(p as u8).map_err(|e| invalid(e.to_string()))?;
        if Regime::at_anchor(predictability).is_none() {
            return Err(invalid(format!(
                "predictability_numeric {} is not one of 0, 50, 100",
                predictability
            )));
        }

        Ok(OutcomeRow {
            predictability,
            frequency: raw.frequency,
            lives_saved_annually: raw.lives_saved_annually,
            lives_saved_per_1000: raw.lives_saved_per_1000,
            info_percent: raw.info_percent,
        })
    }
}

/// Sorted `(decrease, current, increase)` frequencies of one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTiers {
    pub decrease: f64,
    pub current: f64,
    pub increase: f64,
}

impl FrequencyTiers {
    pub fn get(&self, tier: FrequencyTier) -> f64 {
        match tier {
            FrequencyTier::Decrease => self.decrease,
            FrequencyTier::Current => self.current,
            FrequencyTier::Increase => self.increase,
        }
    }

    /// Tier whose frequency matches `frequency` within `tolerance`.
    pub fn tier_of(&self, frequency: f64, tolerance: f64) -> Option<FrequencyTier> {
        FrequencyTier::ALL
            .into_iter()
            .find(|t| (self.get(*t) - frequency).abs() <= tolerance)
    }
}

/// Fixed chart domain for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimit {
    pub metric: Metric,
    pub min: f64,
    pub max: f64,
}

/// Policy outcome table, sorted by regime then frequency.
#[derive(Debug, Clone)]
pub struct OutcomeTable {
    rows: Vec<OutcomeRow>,
    params: OutcomeParams,
}

impl OutcomeTable {
    /// Load the table from a CSV file.
    pub fn from_path(path: &Path, params: &OutcomeParams) -> Result<Self, OutcomeError> {
        let file = std::fs::File::open(path).map_err(|source| OutcomeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, params)
    }

    /// Parse the table from any CSV reader.
    pub fn from_reader<R: Read>(reader: R, params: &OutcomeParams) -> Result<Self, OutcomeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.deserialize::<RawRow>().enumerate() {
            // Data rows start on line 2.
            rows.push(OutcomeRow::from_raw(record?, idx + 2)?);
        }
        Self::from_rows(rows, params)
    }

    /// Build a table from already-parsed rows.
    pub fn from_rows(mut rows: Vec<OutcomeRow>, params: &OutcomeParams) -> Result<Self, OutcomeError> {
        if rows.is_empty() {
            return Err(OutcomeError::Empty);
        }
        rows.sort_by(|a, b| {
            a.predictability
                .cmp(&b.predictability)
                .then(a.frequency.total_cmp(&b.frequency))
        });
        Ok(OutcomeTable {
            rows,
            params: params.clone(),
        })
    }

    pub fn rows(&self) -> &[OutcomeRow] {
        &self.rows
    }

    pub fn params(&self) -> &OutcomeParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows recorded at predictability `p`, ascending by frequency.
    pub fn rows_for(&self, p: Predictability) -> impl Iterator<Item = &OutcomeRow> {
        self.rows.iter().filter(move |r| r.predictability == p)
    }

    /// Exact scenario lookup (frequency within the configured tolerance).
    pub fn lookup(&self, p: Predictability, frequency: f64) -> Result<&OutcomeRow, OutcomeError> {
        let tol = self.params.frequency_tolerance;
        self.rows_for(p)
            .find(|r| (r.frequency - frequency).abs() <= tol)
            .ok_or(OutcomeError::ScenarioNotFound {
                predictability: p.value(),
                frequency,
            })
    }

    /// Frequencies available at `p`, ascending.
    pub fn frequency_options(&self, p: Predictability) -> Vec<f64> {
        self.rows_for(p).map(|r| r.frequency).collect()
    }

    /// The three frequency tiers at `p`.
    pub fn frequency_tiers(&self, p: Predictability) -> Result<FrequencyTiers, OutcomeError> {
        let options = self.frequency_options(p);
        match options.as_slice() {
            &[decrease, current, increase] => Ok(FrequencyTiers {
                decrease,
                current,
                increase,
            }),
            other => Err(OutcomeError::InvalidTiers {
                predictability: p.value(),
                count: other.len(),
            }),
        }
    }

    /// Every row labelled for display, in chart order.
    pub fn scenarios(&self) -> Result<Vec<Scenario>, OutcomeError> {
        let tol = self.params.frequency_tolerance;
        let mut out = Vec::with_capacity(self.rows.len());
        for regime in Regime::ALL {
            let p = regime.anchor();
            if self.rows_for(p).next().is_none() {
                continue;
            }
            let tiers = self.frequency_tiers(p)?;
            for row in self.rows_for(p) {
                let tier = tiers
                    .tier_of(row.frequency, tol)
                    .unwrap_or(FrequencyTier::Current);
                out.push(Scenario {
                    key: Scenario::key_for(row),
                    label: scenario_label(regime, row.frequency, tol),
                    regime,
                    tier,
                    row: row.clone(),
                    total_inspections: total_inspections(row.frequency, self.params.facilities),
                });
            }
        }
        Ok(out)
    }

    /// Per-metric chart domain: `(0, max * 1.10)`, information fixed at `(0, 100)`.
    /// Inspection totals are plotted rounded, not truncated.
    pub fn axis_limits(&self) -> Vec<AxisLimit> {
        Metric::ALL
            .into_iter()
            .map(|metric| {
                let facilities = self.params.facilities;
                let plotted = |r: &OutcomeRow| match metric {
                    Metric::TotalInspections => chart_inspections(r.frequency, facilities),
                    _ => r.value(metric, facilities),
                };
                let max = match metric {
                    Metric::Information => 100.0,
                    _ => self.rows.iter().map(plotted).fold(0.0, f64::max) * 1.10,
                };
                AxisLimit {
                    metric,
                    min: 0.0,
                    max,
                }
            })
            .collect()
    }
}
