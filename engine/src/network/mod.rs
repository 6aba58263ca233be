//! Rate vector and reaction network for ribosome initiation
//!
//! With `N` transcripts in canonical order the network has `2N + 1` species:
//!
//! ```text
//! [ free_0 .. free_{N-1} | bound_0 .. bound_{N-1} | unbound_ribosomes ]
//! ```
//!
//! and `N` reactions. Reaction `i` consumes one unbound ribosome and one free
//! copy of transcript `i`, producing one bound copy of transcript `i`. Its
//! rate constant is the transcript's binding affinity, so the propensity is
//! `affinity_i × free_i × unbound` (mass action).
//!
//! The network is built once when the process is constructed and reused by
//! every call.

use crate::models::transcript::TranscriptKey;
use std::collections::HashMap;
use thiserror::Error;

/// Errors building the affinity vector
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Affinity for transcript {key} must be finite and non-negative (got {value})")]
    InvalidAffinity { key: TranscriptKey, value: f64 },

    #[error("No affinity given for transcript {0}")]
    MissingAffinity(TranscriptKey),
}

/// Affinity of every transcript, aligned with the canonical order
pub fn build_affinity_vector(
    order: &[TranscriptKey],
    affinities: &HashMap<TranscriptKey, f64>,
) -> Result<Vec<f64>, NetworkError> {
    order
        .iter()
        .map(|key| {
            let value = *affinities
                .get(key)
                .ok_or_else(|| NetworkError::MissingAffinity(key.clone()))?;
            if !value.is_finite() || value < 0.0 {
                return Err(NetworkError::InvalidAffinity {
                    key: key.clone(),
                    value,
                });
            }
            Ok(value)
        })
        .collect()
}

/// Stoichiometric matrix (reactions × species) for `transcript_count` transcripts
///
/// # Example
/// ```
/// use stochastic_translation_rs::network::build_stoichiometry;
///
/// let matrix = build_stoichiometry(2);
/// assert_eq!(matrix, vec![
///     vec![-1, 0, 1, 0, -1],
///     vec![0, -1, 0, 1, -1],
/// ]);
/// ```
pub fn build_stoichiometry(transcript_count: usize) -> Vec<Vec<i64>> {
    let species = 2 * transcript_count + 1;
    (0..transcript_count)
        .map(|reaction| {
            let mut row = vec![0; species];
            row[reaction] = -1;
            row[transcript_count + reaction] = 1;
            row[2 * transcript_count] = -1;
            row
        })
        .collect()
}

/// Non-zero entry of a stoichiometry row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpeciesDelta {
    species: usize,
    delta: i64,
}

/// Initiation reaction network
#[derive(Debug, Clone)]
pub struct ReactionNetwork {
    transcript_count: usize,
    stoichiometry: Vec<Vec<i64>>,
    deltas: Vec<Vec<SpeciesDelta>>,
}

impl ReactionNetwork {
    pub fn new(transcript_count: usize) -> Self {
        let stoichiometry = build_stoichiometry(transcript_count);
        let deltas = stoichiometry
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, delta)| **delta != 0)
                    .map(|(species, delta)| SpeciesDelta {
                        species,
                        delta: *delta,
                    })
                    .collect()
            })
            .collect();

        Self {
            transcript_count,
            stoichiometry,
            deltas,
        }
    }

    pub fn transcript_count(&self) -> usize {
        self.transcript_count
    }

    pub fn species_count(&self) -> usize {
        2 * self.transcript_count + 1
    }

    pub fn reaction_count(&self) -> usize {
        self.transcript_count
    }

    pub fn stoichiometry(&self) -> &[Vec<i64>] {
        &self.stoichiometry
    }

    /// Index of the unbound-ribosome species
    pub fn ribosome_species(&self) -> usize {
        2 * self.transcript_count
    }

    /// Assemble `[free.., bound.., unbound]`
    pub fn substrate(&self, free: &[i64], bound: &[i64], unbound_ribosomes: i64) -> Vec<i64> {
        debug_assert_eq!(free.len(), self.transcript_count);
        debug_assert_eq!(bound.len(), self.transcript_count);

        let mut substrate = Vec::with_capacity(self.species_count());
        substrate.extend_from_slice(free);
        substrate.extend_from_slice(bound);
        substrate.push(unbound_ribosomes);
        substrate
    }

    /// Mass-action propensity of every reaction in `state`
    pub fn propensities(&self, rates: &[f64], state: &[i64], out: &mut Vec<f64>) {
        out.clear();
        out.extend(
            self.deltas
                .iter()
                .zip(rates)
                .map(|(deltas, rate)| mass_action(*rate, deltas, state)),
        );
    }

    /// Apply one firing of `reaction` to `state`
    pub fn fire(&self, reaction: usize, state: &mut [i64]) {
        for entry in &self.deltas[reaction] {
            state[entry.species] += entry.delta;
        }
    }
}

fn mass_action(rate: f64, deltas: &[SpeciesDelta], state: &[i64]) -> f64 {
    let mut propensity = rate;
    for reactant in deltas.iter().filter(|d| d.delta < 0) {
        let needed = -reactant.delta;
        let available = state[reactant.species];
        if available < needed {
            return 0.0;
        }
        propensity *= falling_factorial(available, needed);
    }
    propensity
}

fn falling_factorial(n: i64, k: i64) -> f64 {
    (0..k).map(|i| (n - i) as f64).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<TranscriptKey> {
        vec![TranscriptKey::new("oA", "eA"), TranscriptKey::new("oB", "eB")]
    }

    #[test]
    fn test_affinity_vector_follows_order() {
        let order = keys();
        let affinities = HashMap::from([(order[1].clone(), 5.0), (order[0].clone(), 1.0)]);

        assert_eq!(build_affinity_vector(&order, &affinities).unwrap(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_negative_affinity_rejected() {
        let order = keys();
        let affinities = HashMap::from([(order[0].clone(), 1.0), (order[1].clone(), -0.5)]);

        assert!(matches!(
            build_affinity_vector(&order, &affinities),
            Err(NetworkError::InvalidAffinity { .. })
        ));
    }

    #[test]
    fn test_missing_affinity_rejected() {
        let order = keys();
        let affinities = HashMap::from([(order[0].clone(), 1.0)]);

        assert_eq!(
            build_affinity_vector(&order, &affinities),
            Err(NetworkError::MissingAffinity(order[1].clone()))
        );
    }

    #[test]
    fn test_network_shape() {
        let network = ReactionNetwork::new(3);
        assert_eq!(network.species_count(), 7);
        assert_eq!(network.reaction_count(), 3);
        assert_eq!(network.ribosome_species(), 6);
        assert_eq!(network.stoichiometry().len(), 3);
    }

    #[test]
    fn test_propensity_is_mass_action() {
        let network = ReactionNetwork::new(2);
        let state = network.substrate(&[4, 0], &[1, 2], 3);
        let mut propensities = Vec::new();

        network.propensities(&[2.0, 5.0], &state, &mut propensities);
        assert_eq!(propensities, vec![2.0 * 4.0 * 3.0, 0.0]);
    }

    #[test]
    fn test_no_ribosomes_no_propensity() {
        let network = ReactionNetwork::new(1);
        let state = network.substrate(&[10], &[0], 0);
        let mut propensities = Vec::new();

        network.propensities(&[1.0], &state, &mut propensities);
        assert_eq!(propensities, vec![0.0]);
    }

    #[test]
    fn test_fire_moves_copy_from_free_to_bound() {
        let network = ReactionNetwork::new(2);
        let mut state = network.substrate(&[4, 2], &[0, 0], 3);

        network.fire(1, &mut state);
        assert_eq!(state, vec![4, 1, 0, 1, 2]);
    }
}
