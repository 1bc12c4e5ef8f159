//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::model::{EffortCurve, ModelConfig, ScheduledHazard};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

fn require_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(invalid(field, format!("Must be finite, got {}", value)));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, format!("Must be > 0, got {}", value)));
    }
    Ok(())
}

/// Validate a model configuration semantically.
pub fn validate_model(model: &ModelConfig) -> ValidationResult<()> {
    if model.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: model.schema_version.clone(),
        });
    }

    let cycle = &model.cycle;
    if cycle.cycle_weeks < 2 {
        return Err(invalid(
            "cycle.cycle_weeks",
            format!("Must be >= 2, got {}", cycle.cycle_weeks),
        ));
    }
    if cycle.horizon <= cycle.cycle_weeks as usize {
        return Err(ValidationError::SemanticError(format!(
            "cycle.horizon ({}) must exceed cycle.cycle_weeks ({})",
            cycle.horizon, cycle.cycle_weeks
        )));
    }
    if cycle.revisit_weeks >= cycle.cycle_weeks {
        return Err(ValidationError::SemanticError(format!(
            "cycle.revisit_weeks ({}) must be shorter than cycle.cycle_weeks ({})",
            cycle.revisit_weeks, cycle.cycle_weeks
        )));
    }
    if cycle.display_weeks == 0 {
        return Err(invalid("cycle.display_weeks", "Must be > 0".to_string()));
    }

    validate_scheduled_hazard(&model.hazard.scheduled, cycle.horizon)?;
    validate_effort_curve("effort.scheduled", &model.effort.scheduled)?;
    validate_effort_curve("effort.unpredictable", &model.effort.unpredictable)?;

    let sampling = &model.sampling;
    if sampling.dots_per_regime == 0 {
        return Err(invalid("sampling.dots_per_regime", "Must be > 0".to_string()));
    }
    if sampling.grid_columns == 0 {
        return Err(invalid("sampling.grid_columns", "Must be > 0".to_string()));
    }
    if sampling.histogram_bins == 0 {
        return Err(invalid("sampling.histogram_bins", "Must be > 0".to_string()));
    }
    let [q1, q2] = sampling.effort_bin_quantiles;
    if !(0.0 < q1 && q1 < q2 && q2 < 1.0) {
        return Err(invalid(
            "sampling.effort_bin_quantiles",
            format!("Must satisfy 0 < q1 < q2 < 1, got [{}, {}]", q1, q2),
        ));
    }

    let outcomes = &model.outcomes;
    if outcomes.facilities == 0 {
        return Err(invalid("outcomes.facilities", "Must be > 0".to_string()));
    }
    require_positive(
        "outcomes.baseline_snap_tolerance",
        outcomes.baseline_snap_tolerance,
    )?;
    require_positive("outcomes.frequency_tolerance", outcomes.frequency_tolerance)?;

    Ok(())
}

fn validate_scheduled_hazard(hazard: &ScheduledHazard, horizon: usize) -> ValidationResult<()> {
    match hazard {
        ScheduledHazard::Spike { week: Some(week) } => {
            if *week as usize >= horizon {
                return Err(invalid(
                    "hazard.scheduled.week",
                    format!("Must be < horizon ({}), got {}", horizon, week),
                ));
            }
        }
        ScheduledHazard::Spike { week: None } => {}
        ScheduledHazard::Sigmoid {
            ceiling,
            steepness,
            midpoint,
        } => {
            require_positive("hazard.scheduled.ceiling", *ceiling)?;
            if *ceiling > 1.0 {
                return Err(invalid(
                    "hazard.scheduled.ceiling",
                    format!("Must be in (0, 1], got {}", ceiling),
                ));
            }
            require_positive("hazard.scheduled.steepness", *steepness)?;
            require_finite("hazard.scheduled.midpoint", *midpoint)?;
        }
    }
    Ok(())
}

fn validate_effort_curve(name: &str, curve: &EffortCurve) -> ValidationResult<()> {
    match curve {
        EffortCurve::LogisticRamp {
            low,
            high,
            lead_weeks,
            width,
        } => {
            require_finite(&format!("{}.low", name), *low)?;
            require_finite(&format!("{}.high", name), *high)?;
            require_finite(&format!("{}.lead_weeks", name), *lead_weeks)?;
            require_positive(&format!("{}.width", name), *width)?;
        }
        EffortCurve::Flat { level } => {
            require_finite(&format!("{}.level", name), *level)?;
        }
        EffortCurve::QuadraticBowl {
            baseline,
            amplitude,
            midpoint,
        } => {
            require_finite(&format!("{}.baseline", name), *baseline)?;
            require_finite(&format!("{}.amplitude", name), *amplitude)?;
            require_positive(&format!("{}.midpoint", name), *midpoint)?;
        }
        EffortCurve::HazardLinked { floor, slope } => {
            require_finite(&format!("{}.floor", name), *floor)?;
            require_finite(&format!("{}.slope", name), *slope)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate_model(&ModelConfig::default()).unwrap();
    }

    #[test]
    fn version_mismatch_rejected() {
        let mut model = ModelConfig::default();
        model.schema_version = "0.9.0".to_string();
        let err = validate_model(&model).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn horizon_must_exceed_cycle() {
        let mut model = ModelConfig::default();
        model.cycle.horizon = 53;
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn spike_week_beyond_horizon_rejected() {
        let mut model = ModelConfig::default();
        model.hazard.scheduled = ScheduledHazard::Spike { week: Some(300) };
        let err = validate_model(&model).unwrap_err();
        assert!(err.to_string().contains("hazard.scheduled.week"));
    }

    #[test]
    fn sigmoid_ceiling_bounds() {
        let mut model = ModelConfig::default();
        model.hazard.scheduled = ScheduledHazard::Sigmoid {
            ceiling: 1.5,
            steepness: 0.3,
            midpoint: 45.0,
        };
        assert!(validate_model(&model).is_err());
    }

    #[test]
    fn ramp_width_must_be_positive() {
        let mut model = ModelConfig::default();
        model.effort.scheduled = EffortCurve::LogisticRamp {
            low: 0.0,
            high: 1.0,
            lead_weeks: 6.0,
            width: 0.0,
        };
        let err = validate_model(&model).unwrap_err();
        assert!(err.to_string().contains("effort.scheduled.width"));
    }

    #[test]
    fn quantiles_must_be_ordered() {
        let mut model = ModelConfig::default();
        model.sampling.effort_bin_quantiles = [0.7, 0.3];
        assert!(validate_model(&model).is_err());
    }

    #[test]
    fn nan_level_rejected() {
        let mut model = ModelConfig::default();
        model.effort.unpredictable = EffortCurve::Flat { level: f64::NAN };
        assert!(validate_model(&model).is_err());
    }
}
