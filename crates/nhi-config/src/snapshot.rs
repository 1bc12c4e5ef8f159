//! Configuration snapshots for command output and reproducibility.
//!
//! A snapshot records which model file produced a result, its content hash,
//! and the key parameters, so outputs can be compared later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigPaths, ConfigSource};
use crate::ModelConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the model JSON content.
    #[serde(default)]
    pub model_hash: Option<String>,

    /// Path the model was loaded from.
    #[serde(default)]
    pub model_path: Option<String>,

    /// Source of the model configuration.
    pub model_source: String,

    /// Hash of the effective configuration (for quick comparison).
    pub effective_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub cycle_weeks: u32,
    pub horizon: usize,
    pub scheduled_hazard: String,
    pub scheduled_effort: String,
    pub unpredictable_effort: String,
    pub seed: u64,
}

impl ConfigSnapshot {
    /// Create a snapshot of a loaded model.
    ///
    /// `model_json` is the raw file content when the model came from a file.
    pub fn new(model: &ModelConfig, paths: &ConfigPaths, model_json: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: model.schema_version.clone(),
            model_hash: model_json.map(hash_content),
            model_path: paths.model.as_ref().map(|p| p.display().to_string()),
            model_source: paths.model_source.to_string(),
            effective_hash: effective_hash(model),
            summary: ConfigSummary::from(model),
        }
    }

    /// Create a snapshot with only defaults (no config file loaded).
    pub fn defaults_only() -> Self {
        let model = ModelConfig::default();
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: model.schema_version.clone(),
            model_hash: None,
            model_path: None,
            model_source: ConfigSource::BuiltinDefault.to_string(),
            effective_hash: effective_hash(&model),
            summary: ConfigSummary::from(&model),
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same effective config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.effective_hash == other.effective_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.effective_hash[..12.min(self.effective_hash.len())]
    }
}

impl From<&ModelConfig> for ConfigSummary {
    fn from(model: &ModelConfig) -> Self {
        ConfigSummary {
            cycle_weeks: model.cycle.cycle_weeks,
            horizon: model.cycle.horizon,
            scheduled_hazard: model.hazard.scheduled.kind().to_string(),
            scheduled_effort: model.effort.scheduled.kind().to_string(),
            unpredictable_effort: model.effort.unpredictable.kind().to_string(),
            seed: model.sampling.seed,
        }
    }
}

fn effective_hash(model: &ModelConfig) -> String {
    // Serializing a plain struct of numbers and strings cannot fail.
    let canonical = serde_json::to_string(model).unwrap_or_default();
    hash_content(&canonical)
}

/// Hash content with SHA-256 and return hex string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_snapshot() {
        let snapshot = ConfigSnapshot::defaults_only();
        assert_eq!(snapshot.schema_version, crate::CONFIG_SCHEMA_VERSION);
        assert!(snapshot.model_hash.is_none());
        assert_eq!(snapshot.model_source, "builtin default");
        assert_eq!(snapshot.summary.cycle_weeks, 53);
        assert_eq!(snapshot.summary.scheduled_effort, "logistic_ramp");
    }

    #[test]
    fn test_snapshot_short_id() {
        let snapshot = ConfigSnapshot::defaults_only();
        assert_eq!(snapshot.short_id().len(), 12);
    }

    #[test]
    fn test_snapshot_matches_equal_models() {
        let s1 = ConfigSnapshot::defaults_only();
        let s2 = ConfigSnapshot::new(&ModelConfig::default(), &ConfigPaths::default(), None);
        assert!(s1.matches(&s2));
    }

    #[test]
    fn test_snapshot_differs_on_change() {
        let mut model = ModelConfig::default();
        model.sampling.seed = 99;
        let changed = ConfigSnapshot::new(&model, &ConfigPaths::default(), Some("{}"));
        assert!(!changed.matches(&ConfigSnapshot::defaults_only()));
        assert_eq!(changed.model_hash.as_deref().map(str::len), Some(64));
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = ConfigSnapshot::defaults_only();
        let json = snapshot.to_json().unwrap();
        let restored = ConfigSnapshot::from_json(&json).unwrap();
        assert!(snapshot.matches(&restored));
    }
}
