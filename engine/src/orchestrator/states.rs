//! Per-call input snapshot
//!
//! The scheduling framework hands the process one `ProcessStates` per call
//! and applies the returned [`TranslationUpdate`] to it afterwards.
//! [`ProcessStates::apply_update`] reproduces those framework semantics so
//! callers without a framework (the CLI, multi-call tests) can chain calls.

use crate::models::ribosome::{Ribosome, RibosomeId, UNBOUND_RIBOSOME_KEY};
use crate::orchestrator::update::TranslationUpdate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of every port the process reads
///
/// # Fields
///
/// * `ribosomes` - Live ribosomes keyed by id
/// * `molecules` - Monomer and cofactor counts
/// * `transcripts` - Copy number per operon
/// * `proteins` - Protein counts, including the unbound ribosome pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessStates {
    pub ribosomes: BTreeMap<RibosomeId, Ribosome>,
    pub molecules: BTreeMap<String, i64>,
    pub transcripts: BTreeMap<String, i64>,
    pub proteins: BTreeMap<String, i64>,
}

impl ProcessStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Size of the unbound ribosome pool (0 when absent)
    pub fn unbound_ribosomes(&self) -> i64 {
        self.proteins
            .get(UNBOUND_RIBOSOME_KEY)
            .copied()
            .unwrap_or(0)
    }

    pub fn set_unbound_ribosomes(&mut self, count: i64) {
        self.proteins.insert(UNBOUND_RIBOSOME_KEY.to_string(), count);
    }

    /// Apply an update the way the framework does
    ///
    /// Continuing ribosomes are overwritten, added ones inserted, deleted ones
    /// removed; molecule and protein deltas are added to the current counts
    /// (missing keys start from 0).
    pub fn apply_update(&mut self, update: &TranslationUpdate) {
        for id in &update.ribosomes.delete {
            self.ribosomes.remove(id);
        }
        for (id, ribosome) in &update.ribosomes.continuing {
            self.ribosomes.insert(*id, ribosome.clone());
        }
        for added in &update.ribosomes.add {
            self.ribosomes.insert(added.key, added.state.clone());
        }

        for (key, delta) in &update.molecules {
            *self.molecules.entry(key.clone()).or_insert(0) += delta;
        }
        for (key, delta) in &update.proteins {
            *self.proteins.entry(key.clone()).or_insert(0) += delta;
        }
    }
}
