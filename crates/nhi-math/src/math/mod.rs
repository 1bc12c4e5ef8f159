//! Core math modules.

pub mod hazard;
pub mod series;
