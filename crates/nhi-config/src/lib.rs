//! Inspection timing model configuration.
//!
//! This crate provides:
//! - Typed Rust structs for model.json
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for command output

pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use model::{
    CycleParams, EffortCurve, EffortParams, HazardParams, ModelConfig, OutcomeParams,
    SamplingParams, ScheduledHazard,
};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_model, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
