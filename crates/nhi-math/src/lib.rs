//! Inspection timing math utilities.

pub mod math;

pub use math::hazard::*;
pub use math::series::*;
