//! Checkpoint - carry-over state between calls
//!
//! Between calls a process keeps exactly three pieces of state: the
//! fractional elongation progress, the ribosome id counter and the generator
//! state. A checkpoint hands them to a fresh process built from the same
//! configuration, which then continues bit-identically.
//!
//! # Config Matching
//!
//! A checkpoint records the SHA-256 fingerprint of the canonical JSON of the
//! configuration it was taken from and can only be restored against a
//! configuration with the same fingerprint.

use crate::models::ribosome::RibosomeId;
use crate::orchestrator::config::ConfigError;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised while taking or restoring a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config mismatch: checkpoint taken with {expected}, restoring with {actual}")]
    ConfigMismatch { expected: String, actual: String },

    #[error("Elongation offset {0} outside [0, 1)")]
    InvalidOffset(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Carry-over state of one process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCheckpoint {
    /// Next ribosome id to issue
    pub next_ribosome_id: RibosomeId,

    /// Elongation progress not yet converted into monomer steps
    pub elongation_offset: f64,

    /// Generator state (CRITICAL for determinism)
    pub rng: RngManager,

    /// SHA256 of the canonical configuration
    pub config_hash: String,
}

impl ProcessCheckpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    pub(crate) fn validate(&self, config_hash: &str) -> Result<(), CheckpointError> {
        if self.config_hash != config_hash {
            return Err(CheckpointError::ConfigMismatch {
                expected: self.config_hash.clone(),
                actual: config_hash.to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.elongation_offset) {
            return Err(CheckpointError::InvalidOffset(self.elongation_offset));
        }
        Ok(())
    }
}

/// Fingerprint a configuration as the hex SHA-256 of its canonical JSON
///
/// The canonical form has every object's keys in ascending order, so two
/// configurations that serialize the same fields to the same values share a
/// fingerprint whatever order their maps were filled in.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, CheckpointError> {
    let canonical = serde_json::to_value(config)
        .map(with_sorted_keys)
        .map_err(config_serialization)?;

    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, &canonical).map_err(config_serialization)?;
    Ok(hex(&hasher.finalize()))
}

fn with_sorted_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, with_sorted_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(with_sorted_keys).collect()),
        scalar => scalar,
    }
}

fn config_serialization(err: serde_json::Error) -> CheckpointError {
    CheckpointError::Serialization(format!("configuration: {}", err))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::config::TranslationConfig;

    #[test]
    fn test_config_hash_is_stable() {
        let config = TranslationConfig::default();
        let first = compute_config_hash(&config).unwrap();
        let second = compute_config_hash(&config.clone()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_config_hash_changes_with_parameters() {
        let config = TranslationConfig::default();
        let mut faster = config.clone();
        faster.elongation_rate = 10.0;

        assert_ne!(
            compute_config_hash(&config).unwrap(),
            compute_config_hash(&faster).unwrap()
        );
    }

    #[test]
    fn test_config_hash_ignores_key_insertion_order() {
        let mut forward = serde_json::Map::new();
        forward.insert("rate".to_string(), Value::from(5.0));
        forward.insert("order".to_string(), serde_json::json!({"b": 1, "a": 2}));

        let mut backward = serde_json::Map::new();
        backward.insert("order".to_string(), serde_json::json!({"a": 2, "b": 1}));
        backward.insert("rate".to_string(), Value::from(5.0));

        assert_eq!(
            compute_config_hash(&Value::Object(forward)).unwrap(),
            compute_config_hash(&Value::Object(backward)).unwrap()
        );
    }

    #[test]
    fn test_config_hash_is_lowercase_hex() {
        let hash = compute_config_hash(&serde_json::json!({})).unwrap();

        // SHA-256 of "{}"
        assert_eq!(
            hash,
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_validate_rejects_foreign_hash() {
        let checkpoint = ProcessCheckpoint {
            next_ribosome_id: 1,
            elongation_offset: 0.5,
            rng: RngManager::new(3),
            config_hash: "abc".to_string(),
        };

        assert!(checkpoint.validate("abc").is_ok());
        assert!(matches!(
            checkpoint.validate("def"),
            Err(CheckpointError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_offset_out_of_range() {
        let checkpoint = ProcessCheckpoint {
            next_ribosome_id: 1,
            elongation_offset: 1.5,
            rng: RngManager::new(3),
            config_hash: "abc".to_string(),
        };

        assert!(matches!(
            checkpoint.validate("abc"),
            Err(CheckpointError::InvalidOffset(_))
        ));
    }
}
