//! Structured event definitions for logging.
//!
//! Event names, stages and the correlation context passed to `log_event!`.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Processing stages of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and argument handling.
    Init,
    /// Model configuration resolution and validation.
    Config,
    /// Hazard calibration and effort evaluation.
    Mechanism,
    /// Outcome table loading and lookups.
    Outcomes,
    /// Seeded week sampling.
    Sample,
    /// Payload rendering.
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Config => "config",
            Stage::Mechanism => "mechanism",
            Stage::Outcomes => "outcomes",
            Stage::Sample => "sample",
            Stage::Render => "render",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Mechanism stage
    pub const MECHANISM_CALIBRATED: &str = "mechanism.calibrated";
    pub const MECHANISM_FALLBACK: &str = "mechanism.fallback";
    pub const MECHANISM_UNREACHABLE: &str = "mechanism.unreachable";

    // Outcomes stage
    pub const OUTCOMES_LOADED: &str = "outcomes.loaded";
    pub const OUTCOMES_LOOKUP_MISS: &str = "outcomes.lookup_miss";
    pub const OUTCOMES_BASELINE_SNAP: &str = "outcomes.baseline_snap";

    // Sample stage
    pub const SAMPLE_DRAWN: &str = "sample.drawn";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Context for generating log events with consistent run IDs.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
    /// Host identifier.
    pub host_id: String,
    /// Command being run.
    pub command: Option<String>,
}

impl LogContext {
    /// Create a new log context.
    pub fn new(run_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            host_id: host_id.into(),
            command: None,
        }
    }

    /// Set the command name.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}
