//! Nursing-home inspection timing core library
//!
//! This library provides:
//! - Exit codes for CLI operations
//! - Configuration loading and validation
//! - The mechanism model (hazard → time share → average effort)
//! - The policy outcome table, labels and interpolation
//! - Seeded week sampling
//! - Structured logging
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod mechanism;
pub mod outcomes;
pub mod sampling;
