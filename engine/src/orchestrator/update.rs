//! Update assembler
//!
//! Diffs the ribosome population between call entry and exit and turns the
//! per-call accumulators into signed deltas:
//!
//! - `added = current − original`, inserted with their full state
//! - `removed = original − current`, deleted by id
//! - `continuing = original ∩ current`, overwritten with their full state
//!
//! Ribosomes that initiated and terminated within the same call appear in
//! none of the three.
//!
//! Every incorporated monomer costs two high-energy bonds: ATP falls by
//! `2 × total` and ADP rises by the same amount.

use crate::models::ribosome::{Ribosome, RibosomeId, UNBOUND_RIBOSOME_KEY};
use crate::models::table::RibosomeTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const ATP_KEY: &str = "ATP";
pub const ADP_KEY: &str = "ADP";

/// High-energy bonds spent per incorporated monomer
pub const ENERGY_PER_MONOMER: i64 = 2;

/// A ribosome to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibosomeAdd {
    /// Placement in the ribosome collection
    pub key: RibosomeId,
    pub state: Ribosome,
}

/// Changes to the ribosome collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RibosomeUpdate {
    #[serde(rename = "_add")]
    pub add: Vec<RibosomeAdd>,

    #[serde(rename = "_delete")]
    pub delete: Vec<RibosomeId>,

    /// Full replacement state of every ribosome that persisted
    pub continuing: BTreeMap<RibosomeId, Ribosome>,
}

/// Output of one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUpdate {
    pub ribosomes: RibosomeUpdate,

    /// Signed molecule deltas
    pub molecules: BTreeMap<String, i64>,

    /// Signed protein deltas, including the unbound ribosome pool
    pub proteins: BTreeMap<String, i64>,
}

impl TranslationUpdate {
    /// Ids of the ribosomes this update inserts
    pub fn added_ids(&self) -> BTreeSet<RibosomeId> {
        self.ribosomes.add.iter().map(|added| added.key).collect()
    }

    pub fn removed_ids(&self) -> BTreeSet<RibosomeId> {
        self.ribosomes.delete.iter().copied().collect()
    }

    /// Sum of the monomer deltas (ATP/ADP excluded), as a positive count
    pub fn monomers_consumed(&self) -> i64 {
        -self
            .molecules
            .iter()
            .filter(|(key, _)| key.as_str() != ATP_KEY && key.as_str() != ADP_KEY)
            .map(|(_, delta)| delta)
            .sum::<i64>()
    }
}

/// Per-call quantities the assembler turns into deltas
#[derive(Debug)]
pub(crate) struct CallOutcome<'a> {
    pub original: &'a BTreeSet<RibosomeId>,
    pub live: RibosomeTable,
    pub monomer_ids: &'a [String],
    pub consumed: BTreeMap<String, i64>,
    pub protein_ids: &'a [String],
    pub complete_polymers: BTreeMap<String, i64>,
    pub unbound_delta: i64,
}

/// Build the update for one call
pub(crate) fn assemble_update(outcome: CallOutcome<'_>) -> TranslationUpdate {
    let mut ribosomes = RibosomeUpdate::default();
    let mut current = BTreeSet::new();

    for ribosome in outcome.live.into_vec() {
        let id = ribosome.id();
        current.insert(id);
        if outcome.original.contains(&id) {
            ribosomes.continuing.insert(id, ribosome);
        } else {
            ribosomes.add.push(RibosomeAdd {
                key: id,
                state: ribosome,
            });
        }
    }
    ribosomes.delete = outcome.original.difference(&current).copied().collect();

    let mut molecules: BTreeMap<String, i64> = outcome
        .monomer_ids
        .iter()
        .map(|id| (id.clone(), -outcome.consumed.get(id).copied().unwrap_or(0)))
        .collect();
    let total: i64 = outcome.consumed.values().sum();
    *molecules.entry(ATP_KEY.to_string()).or_insert(0) -= ENERGY_PER_MONOMER * total;
    *molecules.entry(ADP_KEY.to_string()).or_insert(0) += ENERGY_PER_MONOMER * total;

    let mut proteins: BTreeMap<String, i64> = outcome
        .protein_ids
        .iter()
        .map(|id| (id.clone(), 0))
        .collect();
    for (product, count) in outcome.complete_polymers {
        *proteins.entry(product).or_insert(0) += count;
    }
    proteins.insert(UNBOUND_RIBOSOME_KEY.to_string(), outcome.unbound_delta);

    TranslationUpdate {
        ribosomes,
        molecules,
        proteins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transcript::TranscriptKey;

    fn polymerizing(id: RibosomeId) -> Ribosome {
        let mut ribosome = Ribosome::new(id, TranscriptKey::new("oA", "eA"), 0);
        ribosome.start_polymerizing().unwrap();
        ribosome
    }

    fn monomers() -> Vec<String> {
        vec!["Alanine".to_string(), "Glycine".to_string()]
    }

    #[test]
    fn test_ribosome_diff() {
        let original = BTreeSet::from([1, 2, 3]);
        let live = RibosomeTable::from_ribosomes(vec![polymerizing(2), polymerizing(5)]).unwrap();
        let monomer_ids = monomers();
        let protein_ids = vec!["eA".to_string()];

        let update = assemble_update(CallOutcome {
            original: &original,
            live,
            monomer_ids: &monomer_ids,
            consumed: BTreeMap::new(),
            protein_ids: &protein_ids,
            complete_polymers: BTreeMap::from([("eA".to_string(), 2)]),
            unbound_delta: 1,
        });

        assert_eq!(update.added_ids(), BTreeSet::from([5]));
        assert_eq!(update.removed_ids(), BTreeSet::from([1, 3]));
        assert_eq!(update.ribosomes.continuing.keys().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(update.proteins["eA"], 2);
        assert_eq!(update.proteins[UNBOUND_RIBOSOME_KEY], 1);
    }

    #[test]
    fn test_cofactor_bookkeeping() {
        let original = BTreeSet::new();
        let monomer_ids = monomers();
        let update = assemble_update(CallOutcome {
            original: &original,
            live: RibosomeTable::new(),
            monomer_ids: &monomer_ids,
            consumed: BTreeMap::from([("Alanine".to_string(), 3), ("Glycine".to_string(), 4)]),
            protein_ids: &[],
            complete_polymers: BTreeMap::new(),
            unbound_delta: 0,
        });

        assert_eq!(update.molecules["Alanine"], -3);
        assert_eq!(update.molecules["Glycine"], -4);
        assert_eq!(update.molecules[ATP_KEY], -14);
        assert_eq!(update.molecules[ADP_KEY], 14);
        assert_eq!(update.monomers_consumed(), 7);
    }

    #[test]
    fn test_untouched_monomers_reported_as_zero() {
        let original = BTreeSet::new();
        let monomer_ids = monomers();
        let update = assemble_update(CallOutcome {
            original: &original,
            live: RibosomeTable::new(),
            monomer_ids: &monomer_ids,
            consumed: BTreeMap::new(),
            protein_ids: &[],
            complete_polymers: BTreeMap::new(),
            unbound_delta: 0,
        });

        assert_eq!(update.molecules["Glycine"], 0);
        assert_eq!(update.molecules[ATP_KEY], 0);
        assert_eq!(update.molecules[ADP_KEY], 0);
    }

    #[test]
    fn test_update_json_shape() {
        let original = BTreeSet::new();
        let live = RibosomeTable::from_ribosomes(vec![polymerizing(4)]).unwrap();
        let update = assemble_update(CallOutcome {
            original: &original,
            live,
            monomer_ids: &[],
            consumed: BTreeMap::new(),
            protein_ids: &[],
            complete_polymers: BTreeMap::new(),
            unbound_delta: -1,
        });

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["ribosomes"]["_add"][0]["key"], 4);
        assert_eq!(json["ribosomes"]["_add"][0]["state"]["state"], "polymerizing");
        assert!(json["ribosomes"]["_delete"].as_array().unwrap().is_empty());
        assert_eq!(json["proteins"]["Ribosome"], -1);
    }
}
