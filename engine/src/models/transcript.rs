//! Transcript model
//!
//! A transcript key pairs an operon with one of its gene products; it is the
//! unit a ribosome binds to. Each key has a template: the ordered list of
//! terminator positions at which a translating ribosome may finish and
//! release its products.
//!
//! Several transcript keys may share an operon. They then share the
//! operon's copy number: ten copies of `oAZ` means ten binding sites for
//! `oAZ:eA` and ten for `oAZ:eZ`.

use crate::rng::RngManager;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator used in the string form of a [`TranscriptKey`]
pub const KEY_SEPARATOR: char = ':';

/// Error parsing a transcript key from its `operon:gene` form
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Malformed transcript key '{0}' (expected 'operon:gene')")]
pub struct KeyParseError(pub String);

/// Identifies an (operon, gene product) pair
///
/// Serializes as the string `operon:gene`, so it can key JSON maps.
///
/// # Example
/// ```
/// use stochastic_translation_rs::TranscriptKey;
///
/// let key: TranscriptKey = "oAZ:eZ".parse().unwrap();
/// assert_eq!(key.operon(), "oAZ");
/// assert_eq!(key.gene(), "eZ");
/// assert_eq!(key.to_string(), "oAZ:eZ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranscriptKey {
    operon: String,
    gene: String,
}

impl TranscriptKey {
    pub fn new(operon: impl Into<String>, gene: impl Into<String>) -> Self {
        Self {
            operon: operon.into(),
            gene: gene.into(),
        }
    }

    pub fn operon(&self) -> &str {
        &self.operon
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    /// True if the key survives a round trip through its string form
    pub fn is_well_formed(&self) -> bool {
        !self.operon.is_empty() && !self.gene.is_empty() && !self.operon.contains(KEY_SEPARATOR)
    }
}

impl fmt::Display for TranscriptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.operon, KEY_SEPARATOR, self.gene)
    }
}

impl FromStr for TranscriptKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(KEY_SEPARATOR) {
            Some((operon, gene)) if !operon.is_empty() && !gene.is_empty() => {
                Ok(Self::new(operon, gene))
            }
            _ => Err(KeyParseError(s.to_string())),
        }
    }
}

impl Serialize for TranscriptKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TranscriptKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A position where a translating ribosome may stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminator {
    /// Sequence position (monomers from the start) of the stop
    pub position: usize,

    /// Relative weight of stopping here versus reading through
    pub strength: f64,

    /// Proteins released when a ribosome stops here (one of each)
    pub products: Vec<String>,
}

/// Terminator layout of one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TranscriptKey,
    pub terminators: Vec<Terminator>,
}

impl Template {
    pub fn terminator(&self, index: usize) -> Option<&Terminator> {
        self.terminators.get(index)
    }

    /// Every product named by any terminator of this template
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.terminators
            .iter()
            .flat_map(|terminator| terminator.products.iter().map(String::as_str))
    }

    /// Position of the final terminator (the furthest a ribosome can travel)
    pub fn last_position(&self) -> usize {
        self.terminators.last().map_or(0, |t| t.position)
    }

    /// Decide whether a ribosome reaching terminator `index` stops there
    ///
    /// The final terminator always terminates. Otherwise the ribosome stops
    /// with probability `strength[index] / Σ strength[index..]`; if every
    /// remaining strength is zero it stops.
    pub fn terminates_at(&self, index: usize, rng: &mut RngManager) -> bool {
        let remaining = match self.terminators.get(index..) {
            Some(remaining) if remaining.len() > 1 => remaining,
            _ => return true,
        };

        let total: f64 = remaining.iter().map(|t| t.strength).sum();
        if total <= 0.0 {
            return true;
        }

        rng.next_f64() * total < remaining[0].strength
    }
}

/// Build a single-terminator template of strength 1.0 at `length`
///
/// # Example
/// ```
/// use stochastic_translation_rs::models::transcript::generate_template;
/// use stochastic_translation_rs::TranscriptKey;
///
/// let template = generate_template(TranscriptKey::new("oA", "eA"), 5, &["product1"]);
/// assert_eq!(template.terminators.len(), 1);
/// assert_eq!(template.last_position(), 5);
/// ```
pub fn generate_template(id: TranscriptKey, length: usize, products: &[&str]) -> Template {
    Template {
        id,
        terminators: vec![Terminator {
            position: length,
            strength: 1.0,
            products: products.iter().map(|p| p.to_string()).collect(),
        }],
    }
}

/// Sorted, de-duplicated union of the products of every template
pub fn all_products<'a>(templates: impl IntoIterator<Item = &'a Template>) -> Vec<String> {
    templates
        .into_iter()
        .flat_map(|template| template.products())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Group transcript keys by operon, operons in order of first appearance
pub fn gather_genes(order: &[TranscriptKey]) -> Vec<(String, Vec<TranscriptKey>)> {
    let mut operons: Vec<(String, Vec<TranscriptKey>)> = Vec::new();

    for key in order {
        match operons.iter_mut().find(|(operon, _)| operon == key.operon()) {
            Some((_, genes)) => genes.push(key.clone()),
            None => operons.push((key.operon().to_string(), vec![key.clone()])),
        }
    }

    operons
}

/// Copy number of every transcript key, in `order`
///
/// Each key inherits its operon's count; operons missing from `transcripts`
/// count as zero.
pub fn transcripts_to_gene_counts(
    transcripts: &BTreeMap<String, i64>,
    order: &[TranscriptKey],
) -> Vec<i64> {
    order
        .iter()
        .map(|key| transcripts.get(key.operon()).copied().unwrap_or(0))
        .collect()
}
