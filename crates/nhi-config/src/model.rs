//! Mechanism model configuration types.
//!
//! These types match `model.json`. Every section is optional in the file;
//! missing sections take the defaults below, which reproduce the current
//! inspection regime of roughly one inspection every 53 weeks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::validate::ValidationError;

/// Complete model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub cycle: CycleParams,

    #[serde(default)]
    pub hazard: HazardParams,

    #[serde(default)]
    pub effort: EffortParams,

    #[serde(default)]
    pub sampling: SamplingParams,

    #[serde(default)]
    pub outcomes: OutcomeParams,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            cycle: CycleParams::default(),
            hazard: HazardParams::default(),
            effort: EffortParams::default(),
            sampling: SamplingParams::default(),
            outcomes: OutcomeParams::default(),
        }
    }
}

impl ModelConfig {
    /// Load a model configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse a model configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Week at which the scheduled regime inspects.
    pub fn scheduled_week(&self) -> u32 {
        match self.hazard.scheduled {
            ScheduledHazard::Spike { week: Some(week) } => week,
            _ => self.cycle.cycle_weeks,
        }
    }
}

/// Inspection cycle geometry, in weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CycleParams {
    /// Target expected cycle length held fixed across regimes.
    pub cycle_weeks: u32,
    /// Post-inspection revisit window, reported for annotation.
    pub revisit_weeks: u32,
    /// Number of weeks summed when building survival curves.
    pub horizon: usize,
    /// Weeks reported in command output (0..display_weeks).
    pub display_weeks: usize,
}

impl Default for CycleParams {
    fn default() -> Self {
        CycleParams {
            cycle_weeks: 53,
            revisit_weeks: 20,
            horizon: 300,
            display_weeks: 61,
        }
    }
}

/// Hazard shape used for the fully predictable end of the blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduledHazard {
    /// Certain inspection at one week (defaults to `cycle_weeks`).
    Spike {
        #[serde(default)]
        week: Option<u32>,
    },
    /// Smooth ramp `ceiling / (1 + exp(-steepness * (w - midpoint)))`.
    Sigmoid {
        ceiling: f64,
        steepness: f64,
        midpoint: f64,
    },
}

impl ScheduledHazard {
    /// Short name for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduledHazard::Spike { .. } => "spike",
            ScheduledHazard::Sigmoid { .. } => "sigmoid",
        }
    }
}

/// Hazard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HazardParams {
    pub scheduled: ScheduledHazard,
}

impl Default for HazardParams {
    fn default() -> Self {
        HazardParams {
            scheduled: ScheduledHazard::Spike { week: None },
        }
    }
}

/// Stylized effort as a function of weeks since the last inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffortCurve {
    /// Low effort for most of the cycle, ramping up `lead_weeks` before the
    /// scheduled inspection.
    LogisticRamp {
        low: f64,
        high: f64,
        lead_weeks: f64,
        width: f64,
    },
    /// Constant effort.
    Flat { level: f64 },
    /// `baseline + amplitude * (2 * ((w - midpoint) / midpoint)^2 - 1)`.
    QuadraticBowl {
        baseline: f64,
        amplitude: f64,
        midpoint: f64,
    },
    /// Effort tracks the inspection threat: `floor + slope * h[w]`.
    HazardLinked { floor: f64, slope: f64 },
}

impl EffortCurve {
    /// Short name for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            EffortCurve::LogisticRamp { .. } => "logistic_ramp",
            EffortCurve::Flat { .. } => "flat",
            EffortCurve::QuadraticBowl { .. } => "quadratic_bowl",
            EffortCurve::HazardLinked { .. } => "hazard_linked",
        }
    }
}

/// Effort curves at the two ends of the predictability blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EffortParams {
    pub scheduled: EffortCurve,
    pub unpredictable: EffortCurve,
}

impl Default for EffortParams {
    fn default() -> Self {
        EffortParams {
            scheduled: EffortCurve::LogisticRamp {
                low: 0.01,
                high: 0.12,
                lead_weeks: 6.0,
                width: 2.5,
            },
            unpredictable: EffortCurve::Flat { level: 0.05 },
        }
    }
}

/// Week sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SamplingParams {
    pub dots_per_regime: usize,
    pub grid_columns: usize,
    pub histogram_samples: usize,
    pub histogram_bins: usize,
    pub seed: u64,
    /// Quantile cut points splitting Low / Medium / High effort.
    pub effort_bin_quantiles: [f64; 2],
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            dots_per_regime: 100,
            grid_columns: 10,
            histogram_samples: 8000,
            histogram_bins: 40,
            seed: 7,
            effort_bin_quantiles: [0.33, 0.66],
        }
    }
}

/// Policy outcome table parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutcomeParams {
    /// CSV path; relative paths resolve against the working directory.
    pub table_path: Option<PathBuf>,
    /// Facilities nationwide; total inspections = frequency × facilities.
    pub facilities: u32,
    /// Distance from a regime's baseline frequency that snaps to its row.
    pub baseline_snap_tolerance: f64,
    /// Tolerance for matching frequencies in lookups.
    pub frequency_tolerance: f64,
}

impl Default for OutcomeParams {
    fn default() -> Self {
        OutcomeParams {
            table_path: None,
            facilities: 15_615,
            baseline_snap_tolerance: 0.02,
            frequency_tolerance: 1e-6,
        }
    }
}
