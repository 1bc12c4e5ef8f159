//! Error types for the inspection timing toolkit.
//!
//! Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification for grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Scenario Not Found
//!   Reason: no outcome row for predictability=50, frequency=0.8
//!   Fix: List the available scenarios with 'nhi-core outcomes scenarios'.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 21,
//!   "category": "data",
//!   "message": "no outcome row for predictability=50, frequency=0.8",
//!   "recoverable": true,
//!   "suggested_action": "adjust_input",
//!   "context": { "predictability": 50, "frequency": 0.8 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Model configuration errors.
    Config,
    /// Outcome table and scenario lookup errors.
    Data,
    /// Numerical model errors and invalid model inputs.
    Model,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for callers to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Reset configuration to defaults.
    ResetConfig,
    /// Run the config validation command.
    RunCheck,
    /// Point at a different outcome table.
    CheckTable,
    /// Change the requested parameters.
    AdjustInput,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::CheckTable => write!(f, "check_table"),
            SuggestedAction::AdjustInput => write!(f, "adjust_input"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for the toolkit.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid model configuration: {0}")]
    InvalidModel(String),

    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    // Data errors (20-29)
    #[error("outcome table error: {0}")]
    OutcomeTable(String),

    #[error("no outcome row for predictability={predictability}, frequency={frequency}")]
    ScenarioNotFound { predictability: u8, frequency: f64 },

    #[error("invalid frequency options for predictability={predictability}: {message}")]
    InvalidTiers { predictability: u8, message: String },

    // Model errors (30-39)
    #[error("invalid model input: {0}")]
    InvalidInput(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Data errors
    /// - 30-39: Model errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidModel(_) => 11,
            Error::SchemaValidation(_) => 12,
            Error::OutcomeTable(_) => 20,
            Error::ScenarioNotFound { .. } => 21,
            Error::InvalidTiers { .. } => 22,
            Error::InvalidInput(_) => 30,
            Error::NumericalInstability(_) => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidModel(_) | Error::SchemaValidation(_) => {
                ErrorCategory::Config
            }
            Error::OutcomeTable(_) | Error::ScenarioNotFound { .. } | Error::InvalidTiers { .. } => {
                ErrorCategory::Data
            }
            Error::InvalidInput(_) | Error::NumericalInstability(_) => ErrorCategory::Model,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidModel(_) | Error::SchemaValidation(_) => true,
            Error::OutcomeTable(_) => true,
            Error::ScenarioNotFound { .. } => true,
            // The table itself is malformed.
            Error::InvalidTiers { .. } => false,
            Error::InvalidInput(_) => true,
            Error::NumericalInstability(_) => false,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for callers.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidModel(_) => SuggestedAction::ResetConfig,
            Error::SchemaValidation(_) => SuggestedAction::RunCheck,
            Error::OutcomeTable(_) => SuggestedAction::CheckTable,
            Error::ScenarioNotFound { .. } => SuggestedAction::AdjustInput,
            Error::InvalidTiers { .. } => SuggestedAction::CheckTable,
            Error::InvalidInput(_) => SuggestedAction::AdjustInput,
            Error::NumericalInstability(_) => SuggestedAction::ManualIntervention,
            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'nhi-core config validate' to check the model file, or remove it to use defaults."
            }
            Error::InvalidModel(_) => {
                "Fix the reported field in model.json, or print the defaults with 'nhi-core config show'."
            }
            Error::SchemaValidation(_) => {
                "Ensure model.json matches the schema printed by 'nhi-core config schema'."
            }
            Error::OutcomeTable(_) => {
                "Check the CSV path (--table or NHI_OUTCOMES_TABLE) and its header row."
            }
            Error::ScenarioNotFound { .. } => {
                "List the available scenarios with 'nhi-core outcomes scenarios'."
            }
            Error::InvalidTiers { .. } => {
                "Each predictability level needs exactly three frequencies (-25%, current, +25%)."
            }
            Error::InvalidInput(_) => "Check the command arguments with '--help'.",
            Error::NumericalInstability(_) => {
                "Internal numerical issue. Re-run with '-vv' and report the parameters used."
            }
            Error::Io(_) => "Check file permissions and paths, then retry.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidModel(_) => "Invalid Model Configuration",
            Error::SchemaValidation(_) => "Schema Validation Failed",
            Error::OutcomeTable(_) => "Outcome Table Error",
            Error::ScenarioNotFound { .. } => "Scenario Not Found",
            Error::InvalidTiers { .. } => "Invalid Frequency Options",
            Error::InvalidInput(_) => "Invalid Input",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for callers.
    pub suggested_action: SuggestedAction,

    /// Additional structured context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ScenarioNotFound {
                predictability,
                frequency,
            } => {
                context.insert("predictability".to_string(), serde_json::json!(predictability));
                context.insert("frequency".to_string(), serde_json::json!(frequency));
            }
            Error::InvalidTiers { predictability, .. } => {
                context.insert("predictability".to_string(), serde_json::json!(predictability));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> Error {
        Error::ScenarioNotFound {
            predictability: 50,
            frequency: 0.8,
        }
    }

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(not_found().code(), 21);
        assert_eq!(Error::InvalidInput("x".into()).code(), 30);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Config("test".into()).category(), ErrorCategory::Config);
        assert_eq!(not_found().category(), ErrorCategory::Data);
        assert_eq!(
            Error::NumericalInstability("nan".into()).category(),
            ErrorCategory::Model
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::Config("test".into()).is_recoverable());
        assert!(not_found().is_recoverable());
        assert!(!Error::InvalidTiers {
            predictability: 0,
            message: "two options".into()
        }
        .is_recoverable());
    }

    #[test]
    fn test_structured_error_from_error() {
        let structured = StructuredError::from(&not_found());

        assert_eq!(structured.code, 21);
        assert_eq!(structured.category, ErrorCategory::Data);
        assert!(structured.recoverable);
        assert_eq!(structured.suggested_action, SuggestedAction::AdjustInput);
        assert_eq!(
            structured.context.get("predictability"),
            Some(&serde_json::json!(50))
        );
    }

    #[test]
    fn test_structured_error_json() {
        let structured = StructuredError::from(&Error::OutcomeTable("missing column".into()))
            .with_context("path", "figure9_summary_raw.csv");
        let json = structured.to_json();

        assert!(json.contains(r#""code":20"#));
        assert!(json.contains(r#""category":"data""#));
        assert!(json.contains(r#""suggested_action":"check_table""#));
        assert!(json.contains("figure9_summary_raw.csv"));
    }

    #[test]
    fn test_format_error_human() {
        let formatted = format_error_human(&not_found(), false);

        assert!(formatted.contains("Scenario Not Found"));
        assert!(formatted.contains("predictability=50, frequency=0.8"));
        assert!(formatted.contains("outcomes scenarios"));
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(ErrorCategory::Data.to_string(), "data");
        assert_eq!(SuggestedAction::AdjustInput.to_string(), "adjust_input");
    }
}
