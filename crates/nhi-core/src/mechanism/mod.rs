//! Inspection timing mechanism model.
//!
//! Predictability blends a scheduled hazard with a flat one while holding
//! the expected cycle length fixed, then weights a stylized effort curve by
//! the stationary share of time spent at each week since the last
//! inspection. The headline result: average effort rises as timing becomes
//! less predictable, because low-effort weeks stop dominating.

pub mod effort;
pub mod hazard;
pub mod model;

pub use effort::effort_curve;
pub use hazard::{blended_hazard, flat_hazard, scheduled_hazard};
pub use model::{MechanismModel, MechanismOutcome, RegimeProfile};

use nhi_common::Error;
use serde::{Deserialize, Serialize};

/// Inspection timing predictability in paper coding.
///
/// 0 = perfectly predictable (scheduled), 50 = current regime,
/// 100 = fully random (flat hazard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Predictability(u8);

impl Predictability {
    pub const MAX: u8 = 100;
    pub const SCHEDULED: Predictability = Predictability(0);
    pub const CURRENT: Predictability = Predictability(50);
    pub const RANDOM: Predictability = Predictability(100);

    /// Create from a paper-coded value in `0..=100`.
    pub fn new(value: u8) -> Result<Self, Error> {
        if value > Self::MAX {
            return Err(Error::InvalidInput(format!(
                "predictability must be in 0..=100, got {}",
                value
            )));
        }
        Ok(Predictability(value))
    }

    /// Create from a dashboard-style scale where 0 means fully random.
    pub fn from_ui_scale(value: u8) -> Result<Self, Error> {
        if value > Self::MAX {
            return Err(Error::InvalidInput(format!(
                "predictability must be in 0..=100, got {}",
                value
            )));
        }
        Ok(Predictability(Self::MAX - value))
    }

    /// Paper-coded value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Value on the reversed dashboard scale.
    pub fn ui_scale(self) -> u8 {
        Self::MAX - self.0
    }

    /// Weight on the flat (unpredictable) component, in `[0, 1]`.
    pub fn random_weight(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX)
    }

    /// Regime band this value falls into.
    pub fn regime(self) -> Regime {
        Regime::from_predictability(self)
    }
}

impl TryFrom<u8> for Predictability {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Predictability::new(value)
    }
}

impl From<Predictability> for u8 {
    fn from(p: Predictability) -> Self {
        p.0
    }
}

impl std::fmt::Display for Predictability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named inspection regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Perfectly predictable timing.
    Scheduled,
    /// The regime in force today.
    Current,
    /// Fully random timing.
    Unpredictable,
}

impl Regime {
    /// All regimes in outcome-table order.
    pub const ALL: [Regime; 3] = [Regime::Scheduled, Regime::Current, Regime::Unpredictable];

    /// Label band: `<= 25` scheduled, `<= 75` current, otherwise unpredictable.
    pub fn from_predictability(p: Predictability) -> Self {
        match p.value() {
            0..=25 => Regime::Scheduled,
            26..=75 => Regime::Current,
            _ => Regime::Unpredictable,
        }
    }

    /// Predictability at which the outcome table records this regime.
    pub fn anchor(self) -> Predictability {
        match self {
            Regime::Scheduled => Predictability::SCHEDULED,
            Regime::Current => Predictability::CURRENT,
            Regime::Unpredictable => Predictability::RANDOM,
        }
    }

    /// The regime recorded at exactly `p`, if any.
    pub fn at_anchor(p: Predictability) -> Option<Regime> {
        Regime::ALL.into_iter().find(|r| r.anchor() == p)
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Regime::Scheduled => "Scheduled",
            Regime::Current => "Current",
            Regime::Unpredictable => "Unpredictable",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictability_bounds() {
        assert!(Predictability::new(100).is_ok());
        let err = Predictability::new(101).unwrap_err();
        assert_eq!(err.code(), 30);
    }

    #[test]
    fn ui_scale_reverses() {
        let p = Predictability::from_ui_scale(0).unwrap();
        assert_eq!(p, Predictability::RANDOM);
        assert_eq!(Predictability::from_ui_scale(30).unwrap().value(), 70);
        assert_eq!(Predictability::new(70).unwrap().ui_scale(), 30);
        assert!(Predictability::from_ui_scale(120).is_err());
    }

    #[test]
    fn regime_bands() {
        let regime = |v| Predictability::new(v).unwrap().regime();
        assert_eq!(regime(0), Regime::Scheduled);
        assert_eq!(regime(25), Regime::Scheduled);
        assert_eq!(regime(26), Regime::Current);
        assert_eq!(regime(75), Regime::Current);
        assert_eq!(regime(76), Regime::Unpredictable);
        assert_eq!(regime(100), Regime::Unpredictable);
    }

    #[test]
    fn anchors_round_trip() {
        for regime in Regime::ALL {
            assert_eq!(Regime::at_anchor(regime.anchor()), Some(regime));
            assert_eq!(regime.anchor().regime(), regime);
        }
        assert_eq!(Regime::at_anchor(Predictability::new(40).unwrap()), None);
    }

    #[test]
    fn serde_rejects_out_of_range() {
        let p: Predictability = serde_json::from_str("42").unwrap();
        assert_eq!(p.value(), 42);
        assert!(serde_json::from_str::<Predictability>("101").is_err());
        assert_eq!(serde_json::to_string(&Regime::Current).unwrap(), "\"current\"");
    }

    #[test]
    fn random_weight_is_fraction() {
        assert_eq!(Predictability::SCHEDULED.random_weight(), 0.0);
        assert_eq!(Predictability::CURRENT.random_weight(), 0.5);
        assert_eq!(Predictability::RANDOM.random_weight(), 1.0);
    }
}
