//! Shared types for the inspection timing toolkit.
//!
//! This crate provides foundational types shared across the workspace:
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use output::OutputFormat;

/// Schema version stamped on every command payload.
pub const SCHEMA_VERSION: &str = "1.0.0";
