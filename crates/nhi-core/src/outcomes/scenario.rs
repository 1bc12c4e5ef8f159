//! Scenario labels, frequency tiers, and reported metrics.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::table::OutcomeRow;
use crate::mechanism::Regime;

/// Outcome metric reported per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Lives saved annually.
    LivesSaved,
    /// Lives saved per 1,000 inspections.
    Efficiency,
    /// Share of regulatory information captured, in percent.
    Information,
    /// Inspections performed nationwide per year. Readouts truncate
    /// ([`total_inspections`]); chart limits round ([`chart_inspections`]).
    TotalInspections,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::LivesSaved,
        Metric::Efficiency,
        Metric::Information,
        Metric::TotalInspections,
    ];

    /// CSV column (or derived column) backing this metric.
    pub fn column(self) -> &'static str {
        match self {
            Metric::LivesSaved => "lives_saved_annually",
            Metric::Efficiency => "lives_saved_per_1000",
            Metric::Information => "info_percent",
            Metric::TotalInspections => "total_inspections",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::LivesSaved => "Lives Saved Annually",
            Metric::Efficiency => "Lives Saved per 1,000 Inspections",
            Metric::Information => "Regulatory Information (%)",
            Metric::TotalInspections => "Total Inspections",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Position of a frequency among a regime's three options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyTier {
    Decrease,
    Current,
    Increase,
}

impl FrequencyTier {
    pub const ALL: [FrequencyTier; 3] = [
        FrequencyTier::Decrease,
        FrequencyTier::Current,
        FrequencyTier::Increase,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FrequencyTier::Decrease => "-25%",
            FrequencyTier::Current => "Current",
            FrequencyTier::Increase => "+25%",
        }
    }
}

/// Frequency the table treats as "current" for a regime.
pub fn baseline_frequency(regime: Regime) -> f64 {
    match regime {
        Regime::Scheduled => 0.98,
        Regime::Current | Regime::Unpredictable => 0.99,
    }
}

/// Chart label for a scenario.
///
/// `frequency` is compared against the regime's baseline within
/// `tolerance`.
pub fn scenario_label(regime: Regime, frequency: f64, tolerance: f64) -> String {
    let baseline = baseline_frequency(regime);
    let at_baseline = (frequency - baseline).abs() <= tolerance;
    let above = frequency > baseline;

    let label = match (regime, at_baseline, above) {
        (Regime::Current, true, _) => "Current Regime",
        (Regime::Current, false, true) => "Increase Frequency (↑ 25%)",
        (Regime::Current, false, false) => "Decrease Frequency (↓ 25%)",
        (Regime::Unpredictable, true, _) => "Unpredictable",
        (Regime::Unpredictable, false, true) => "Unpredictable; Increased Frequency (↑ 25%)",
        (Regime::Unpredictable, false, false) => "Unpredictable; Decreased Frequency (↓ 25%)",
        (Regime::Scheduled, true, _) => "Perfectly Predictable",
        (Regime::Scheduled, false, true) => "Perfectly Predictable; Increased Frequency (↑ 25%)",
        (Regime::Scheduled, false, false) => "Perfectly Predictable; Decreased Frequency (↓ 25%)",
    };
    label.to_string()
}

/// Inspections per year at `frequency` inspections per facility.
pub fn total_inspections(frequency: f64, facilities: u32) -> u64 {
    let total = frequency * f64::from(facilities);
    if total.is_finite() && total > 0.0 {
        total.trunc() as u64
    } else {
        0
    }
}

/// Inspections per year as plotted: rounded to the nearest whole inspection.
pub fn chart_inspections(frequency: f64, facilities: u32) -> f64 {
    let total = frequency * f64::from(facilities);
    if total.is_finite() && total > 0.0 {
        total.round()
    } else {
        0.0
    }
}

/// One row of the outcome table, labelled for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable key `<predictability>_<frequency rounded to 4 places>`.
    pub key: String,
    pub label: String,
    pub regime: Regime,
    pub tier: FrequencyTier,
    #[serde(flatten)]
    pub row: OutcomeRow,
    pub total_inspections: u64,
}

impl Scenario {
    pub fn key_for(row: &OutcomeRow) -> String {
        let rounded = (row.frequency * 10_000.0).round() / 10_000.0;
        format!("{}_{}", row.predictability, rounded)
    }
}
