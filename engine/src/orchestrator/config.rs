//! Translation process configuration
//!
//! `TranslationConfig` enumerates every recognized option. It is validated
//! once, when the process is built; a configuration that passes validation
//! can never make a later call fail.
//!
//! Missing fields take the values of [`TranslationConfig::default`], which
//! describes six transcripts on four operons.

use crate::data::amino_acids::{amino_acid_alphabet, amino_acid_ids};
use crate::models::transcript::{
    all_products, gather_genes, generate_template, Template, TranscriptKey,
};
use crate::network::{build_affinity_vector, NetworkError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Configuration validation errors (fatal, raised at construction)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("At least one transcript must be configured")]
    NoTranscripts,

    #[error("Malformed transcript key {0} (operon and gene must be non-empty, operon without ':')")]
    MalformedKey(TranscriptKey),

    #[error("Transcript {0} listed more than once in transcript_affinities")]
    DuplicateTranscript(TranscriptKey),

    #[error(transparent)]
    Affinity(#[from] NetworkError),

    #[error("Transcript {0} has an affinity but no sequence")]
    MissingSequence(TranscriptKey),

    #[error("Transcript {0} has an affinity but no template")]
    MissingTemplate(TranscriptKey),

    #[error("Sequence given for transcript {0}, which has no affinity")]
    UnexpectedSequence(TranscriptKey),

    #[error("Template given for transcript {0}, which has no affinity")]
    UnexpectedTemplate(TranscriptKey),

    #[error("Template stored under {key} is labelled {id}")]
    TemplateIdMismatch { key: TranscriptKey, id: TranscriptKey },

    #[error("transcript_order must list every transcript with an affinity exactly once")]
    OrderMismatch,

    #[error("Elongation rate must be finite and positive (got {0})")]
    InvalidElongationRate(f64),

    #[error("time_step must be finite and non-negative (got {0})")]
    InvalidTimeStep(f64),

    #[error("Template for {0} has no terminators")]
    NoTerminators(TranscriptKey),

    #[error("Terminator at {position} on {key} must lie in 1..={length} after the previous terminator")]
    TerminatorPosition {
        key: TranscriptKey,
        position: usize,
        length: usize,
    },

    #[error("Terminator strength on {key} must be finite and non-negative (got {strength})")]
    TerminatorStrength { key: TranscriptKey, strength: f64 },

    #[error("Symbol '{symbol}' in the sequence of {key} is not in symbol_to_monomer")]
    UnknownSymbol { key: TranscriptKey, symbol: char },

    #[error("symbol_to_monomer maps '{symbol}' to {monomer}, which is not in monomer_ids")]
    UnknownMonomer { symbol: char, monomer: String },

    #[error("Monomer {0} listed more than once in monomer_ids")]
    DuplicateMonomer(String),
}

/// Binding affinity of one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptAffinity {
    pub transcript: TranscriptKey,
    pub affinity: f64,
}

impl TranscriptAffinity {
    pub fn new(transcript: TranscriptKey, affinity: f64) -> Self {
        Self {
            transcript,
            affinity,
        }
    }
}

/// Complete translation process configuration
///
/// # Fields
///
/// * `sequences` - Monomer symbols of every transcript
/// * `templates` - Terminator layout of every transcript
/// * `transcript_affinities` - Binding affinity per transcript; the list order
///   is the canonical transcript order unless `transcript_order` is given
/// * `elongation_rate` - Monomers incorporated per unit time
/// * `polymerase_occlusion` - Monomers a ribosome must travel before its
///   binding site is free again
/// * `symbol_to_monomer` / `monomer_ids` - Sequence alphabet and the monomer pool
/// * `concentration_keys` - Extra quantities reported on the concentrations port
/// * `time_step` - Default call duration
/// * `rng_seed` - Seed of the process generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationConfig {
    pub sequences: BTreeMap<TranscriptKey, String>,
    pub templates: BTreeMap<TranscriptKey, Template>,
    pub transcript_affinities: Vec<TranscriptAffinity>,
    pub transcript_order: Option<Vec<TranscriptKey>>,
    pub elongation_rate: f64,
    pub polymerase_occlusion: usize,
    pub symbol_to_monomer: BTreeMap<char, String>,
    pub monomer_ids: Vec<String>,
    pub concentration_keys: Vec<String>,
    pub time_step: f64,
    pub rng_seed: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        const A: &str = "MKTAYIAKQRQISFVKSHFS";
        const Z: &str = "MSKGEELFTGVVPILVELDGDVNGHKFSVSGEGEGDATYGKLTLKFICTTGKLPVPWPTL";
        const B: &str = "MAHHHHHHVGTGSNDDDDKSPDLGTDDDDK";
        const Y: &str = "MGSSHHHHHHSSGLVPRGSHMASMTGGQQMGRDLYDDDDK";

        let transcripts = [
            ("oA", "eA", A, 1.0),
            ("oAZ", "eA", A, 2.0),
            ("oAZ", "eZ", Z, 5.0),
            ("oB", "eB", B, 1.0),
            ("oBY", "eB", B, 2.0),
            ("oBY", "eY", Y, 5.0),
        ];

        let mut sequences = BTreeMap::new();
        let mut templates = BTreeMap::new();
        let mut transcript_affinities = Vec::new();
        for (operon, gene, sequence, affinity) in transcripts {
            let key = TranscriptKey::new(operon, gene);
            sequences.insert(key.clone(), sequence.to_string());
            templates.insert(
                key.clone(),
                generate_template(key.clone(), sequence.len(), &[gene]),
            );
            transcript_affinities.push(TranscriptAffinity::new(key, affinity));
        }

        Self {
            sequences,
            templates,
            transcript_affinities,
            transcript_order: None,
            elongation_rate: 5.0,
            polymerase_occlusion: 10,
            symbol_to_monomer: amino_acid_alphabet(),
            monomer_ids: amino_acid_ids(),
            concentration_keys: Vec::new(),
            time_step: 1.0,
            rng_seed: 0,
        }
    }
}

/// Configuration after validation, in canonical transcript order
#[derive(Debug, Clone)]
pub(crate) struct ValidatedConfig {
    pub order: Vec<TranscriptKey>,
    pub affinities: Vec<f64>,
    pub operons: Vec<(String, Vec<TranscriptKey>)>,
    pub sequences: Vec<Vec<usize>>,
    pub templates: Vec<Template>,
    pub monomer_ids: Vec<String>,
    pub protein_ids: Vec<String>,
    pub concentration_keys: Vec<String>,
    pub elongation_rate: f64,
    pub polymerase_occlusion: usize,
    pub time_step: f64,
    pub rng_seed: u64,
}

impl ValidatedConfig {
    pub fn transcript_count(&self) -> usize {
        self.order.len()
    }

    pub fn transcript_index(&self, key: &TranscriptKey) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }
}

impl TranslationConfig {
    /// Parse a configuration from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the configuration without building a process
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map(|_| ())
    }

    pub(crate) fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if !self.elongation_rate.is_finite() || self.elongation_rate <= 0.0 {
            return Err(ConfigError::InvalidElongationRate(self.elongation_rate));
        }
        if !self.time_step.is_finite() || self.time_step < 0.0 {
            return Err(ConfigError::InvalidTimeStep(self.time_step));
        }
        if self.transcript_affinities.is_empty() {
            return Err(ConfigError::NoTranscripts);
        }

        let mut affinities = HashMap::new();
        for entry in &self.transcript_affinities {
            if !entry.transcript.is_well_formed() {
                return Err(ConfigError::MalformedKey(entry.transcript.clone()));
            }
            if affinities
                .insert(entry.transcript.clone(), entry.affinity)
                .is_some()
            {
                return Err(ConfigError::DuplicateTranscript(entry.transcript.clone()));
            }
        }

        let order = self.canonical_order(&affinities)?;
        let affinity_vector = build_affinity_vector(&order, &affinities)?;

        for key in self.sequences.keys() {
            if !affinities.contains_key(key) {
                return Err(ConfigError::UnexpectedSequence(key.clone()));
            }
        }
        for key in self.templates.keys() {
            if !affinities.contains_key(key) {
                return Err(ConfigError::UnexpectedTemplate(key.clone()));
            }
        }

        let monomer_index = self.monomer_index()?;
        let mut sequences = Vec::with_capacity(order.len());
        let mut templates = Vec::with_capacity(order.len());
        for key in &order {
            let sequence = self
                .sequences
                .get(key)
                .ok_or_else(|| ConfigError::MissingSequence(key.clone()))?;
            let template = self
                .templates
                .get(key)
                .ok_or_else(|| ConfigError::MissingTemplate(key.clone()))?;

            let encoded = self.encode_sequence(key, sequence, &monomer_index)?;
            validate_template(key, template, encoded.len())?;

            sequences.push(encoded);
            templates.push(template.clone());
        }

        let protein_ids = all_products(&templates);
        let operons = gather_genes(&order);

        Ok(ValidatedConfig {
            order,
            affinities: affinity_vector,
            operons,
            sequences,
            templates,
            monomer_ids: self.monomer_ids.clone(),
            protein_ids,
            concentration_keys: self.concentration_keys.clone(),
            elongation_rate: self.elongation_rate,
            polymerase_occlusion: self.polymerase_occlusion,
            time_step: self.time_step,
            rng_seed: self.rng_seed,
        })
    }

    fn canonical_order(
        &self,
        affinities: &HashMap<TranscriptKey, f64>,
    ) -> Result<Vec<TranscriptKey>, ConfigError> {
        let Some(order) = &self.transcript_order else {
            return Ok(self
                .transcript_affinities
                .iter()
                .map(|entry| entry.transcript.clone())
                .collect());
        };

        let unique: HashSet<&TranscriptKey> = order.iter().collect();
        if order.len() != affinities.len()
            || unique.len() != order.len()
            || !order.iter().all(|key| affinities.contains_key(key))
        {
            return Err(ConfigError::OrderMismatch);
        }
        Ok(order.clone())
    }

    fn monomer_index(&self) -> Result<HashMap<char, usize>, ConfigError> {
        let mut positions = HashMap::new();
        for (index, id) in self.monomer_ids.iter().enumerate() {
            if positions.insert(id.as_str(), index).is_some() {
                return Err(ConfigError::DuplicateMonomer(id.clone()));
            }
        }

        self.symbol_to_monomer
            .iter()
            .map(|(symbol, monomer)| {
                positions
                    .get(monomer.as_str())
                    .map(|index| (*symbol, *index))
                    .ok_or_else(|| ConfigError::UnknownMonomer {
                        symbol: *symbol,
                        monomer: monomer.clone(),
                    })
            })
            .collect()
    }

    fn encode_sequence(
        &self,
        key: &TranscriptKey,
        sequence: &str,
        monomer_index: &HashMap<char, usize>,
    ) -> Result<Vec<usize>, ConfigError> {
        sequence
            .chars()
            .map(|symbol| {
                monomer_index
                    .get(&symbol)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownSymbol {
                        key: key.clone(),
                        symbol,
                    })
            })
            .collect()
    }
}

fn validate_template(
    key: &TranscriptKey,
    template: &Template,
    length: usize,
) -> Result<(), ConfigError> {
    if &template.id != key {
        return Err(ConfigError::TemplateIdMismatch {
            key: key.clone(),
            id: template.id.clone(),
        });
    }
    if template.terminators.is_empty() {
        return Err(ConfigError::NoTerminators(key.clone()));
    }

    let mut previous = 0;
    for terminator in &template.terminators {
        if terminator.position <= previous || terminator.position > length {
            return Err(ConfigError::TerminatorPosition {
                key: key.clone(),
                position: terminator.position,
                length,
            });
        }
        if !terminator.strength.is_finite() || terminator.strength < 0.0 {
            return Err(ConfigError::TerminatorStrength {
                key: key.clone(),
                strength: terminator.strength,
            });
        }
        previous = terminator.position;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let validated = TranslationConfig::default().validate().unwrap();

        assert_eq!(validated.transcript_count(), 6);
        assert_eq!(validated.operons.len(), 4);
        assert_eq!(validated.protein_ids, vec!["eA", "eB", "eY", "eZ"]);
        assert_eq!(validated.sequences[2].len(), 60);
        assert_eq!(validated.affinities, vec![1.0, 2.0, 5.0, 1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_explicit_order_reorders_affinities() {
        let mut config = TranslationConfig::default();
        let mut order: Vec<_> = config
            .transcript_affinities
            .iter()
            .map(|entry| entry.transcript.clone())
            .collect();
        order.reverse();
        config.transcript_order = Some(order.clone());

        let validated = config.validate().unwrap();
        assert_eq!(validated.order, order);
        assert_eq!(validated.affinities, vec![5.0, 2.0, 1.0, 5.0, 2.0, 1.0]);
        assert_eq!(validated.transcript_index(&order[0]), Some(0));
    }

    #[test]
    fn test_sequences_encoded_with_alphabet() {
        let validated = TranslationConfig::default().validate().unwrap();
        let methionine = validated
            .monomer_ids
            .iter()
            .position(|id| id == "Methionine")
            .unwrap();

        assert!(validated.sequences.iter().all(|s| s[0] == methionine));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = TranslationConfig::from_json(r#"{"elongation_rate": 10.0}"#).unwrap();
        assert_eq!(config.elongation_rate, 10.0);
        assert_eq!(config.polymerase_occlusion, 10);
        assert_eq!(config.transcript_affinities.len(), 6);
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let err = TranslationConfig::from_json(r#"{"elongation": 10.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip_of_default() {
        let config = TranslationConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert_eq!(TranslationConfig::from_json(&json).unwrap(), config);
    }
}
