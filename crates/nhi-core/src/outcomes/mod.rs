//! Precomputed policy outcomes for the nine inspection scenarios.
//!
//! The table is a small CSV with one row per (predictability × frequency)
//! scenario. Each predictability anchor (0, 50, 100) carries exactly three
//! frequencies: a 25% decrease, the current frequency, and a 25% increase.

pub mod interpolate;
pub mod scenario;
pub mod table;

pub use interpolate::{interpolate, AnchorValue, Interpolation};
pub use scenario::{
    baseline_frequency, chart_inspections, scenario_label, total_inspections, FrequencyTier, Metric,
    Scenario,
};
pub use table::{AxisLimit, FrequencyTiers, OutcomeRow, OutcomeTable};

use std::path::PathBuf;
use thiserror::Error;

/// Default table file name, resolved against the working directory.
pub const DEFAULT_TABLE_FILE: &str = "figure9_summary_raw.csv";

/// Environment variable naming the outcome table.
pub const ENV_OUTCOMES_TABLE: &str = "NHI_OUTCOMES_TABLE";

/// Errors from loading or querying the outcome table.
#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("failed to read outcome table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed outcome table: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid outcome row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("outcome table has no rows")]
    Empty,

    #[error("no outcome row for predictability={predictability}, frequency={frequency}")]
    ScenarioNotFound { predictability: u8, frequency: f64 },

    #[error("predictability={predictability} has {count} frequency options, expected 3")]
    InvalidTiers { predictability: u8, count: usize },
}

impl From<OutcomeError> for nhi_common::Error {
    fn from(err: OutcomeError) -> Self {
        match err {
            OutcomeError::ScenarioNotFound {
                predictability,
                frequency,
            } => nhi_common::Error::ScenarioNotFound {
                predictability,
                frequency,
            },
            OutcomeError::InvalidTiers {
                predictability,
                count,
            } => nhi_common::Error::InvalidTiers {
                predictability,
                message: format!("found {} frequency options, expected 3", count),
            },
            other => nhi_common::Error::OutcomeTable(other.to_string()),
        }
    }
}
