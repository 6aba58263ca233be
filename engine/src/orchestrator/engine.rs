//! Translation process - the hybrid simulation loop
//!
//! One call covers a duration `T`. Time advances in grains of
//! `1 / elongation_rate`, the time one monomer takes; the last interval is
//! shorter when `T` is not a whole number of grains. Each iteration:
//!
//! 1. recompute bound/free copies per transcript from the live ribosomes
//! 2. elongate for the interval (a full grain steps, a shorter trailing
//!    interval usually only accumulates progress); terminations refill the
//!    unbound pool
//! 3. sample binding events for the interval from the current substrate
//! 4. apply them in time order, creating one polymerizing ribosome each
//! 5. unocclude every ribosome that has cleared the occlusion window
//!
//! Binding and elongation therefore never drift apart by more than one
//! monomer's worth of time, and the loop runs at most `T × rate + 1` times.
//!
//! # Example
//!
//! ```
//! use stochastic_translation_rs::{ProcessStates, Translation, TranslationConfig};
//!
//! let mut process = Translation::new(TranslationConfig::default()).unwrap();
//!
//! let mut states = ProcessStates::new();
//! states.set_unbound_ribosomes(10);
//! for operon in ["oA", "oAZ", "oB", "oBY"] {
//!     states.transcripts.insert(operon.to_string(), 10);
//! }
//! for monomer in process.monomer_ids() {
//!     states.molecules.insert(monomer.clone(), 100);
//! }
//!
//! let update = process.next_update(1.0, &states).unwrap();
//! assert_eq!(update.molecules["ATP"], -2 * update.monomers_consumed());
//! ```

use crate::elongation::{Elongation, STEP_EPSILON};
use crate::models::event::{EventLog, TranslationEvent};
use crate::models::ribosome::{
    Ribosome, RibosomeError, RibosomeId, RibosomeState, UNBOUND_RIBOSOME_KEY,
};
use crate::models::table::RibosomeTable;
use crate::models::transcript::{transcripts_to_gene_counts, TranscriptKey};
use crate::network::ReactionNetwork;
use crate::orchestrator::checkpoint::{compute_config_hash, CheckpointError, ProcessCheckpoint};
use crate::orchestrator::config::{ConfigError, TranslationConfig, ValidatedConfig};
use crate::orchestrator::states::ProcessStates;
use crate::orchestrator::update::{
    assemble_update, CallOutcome, TranslationUpdate, ADP_KEY, ATP_KEY,
};
use crate::rng::RngManager;
use crate::sampler::{EventSampler, GillespieSampler};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Recoverable call-time errors
///
/// These describe snapshots or arguments the caller should not have passed.
/// The process state is untouched when one is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslationError {
    #[error("Timestep must be finite and non-negative (got {0})")]
    InvalidTimestep(f64),

    #[error("Ribosome {id} references unknown transcript {template}")]
    UnknownTranscript { id: RibosomeId, template: TranscriptKey },

    #[error("Ribosome stored under {key} carries id {id}")]
    IdMismatch { key: RibosomeId, id: RibosomeId },

    #[error("Ribosome {id} at position {position} is not before its next terminator at {limit}")]
    PositionOutOfRange {
        id: RibosomeId,
        position: usize,
        limit: usize,
    },

    #[error("Ribosome {id} heads for terminator {terminator}, template has {count}")]
    TerminatorOutOfRange {
        id: RibosomeId,
        terminator: usize,
        count: usize,
    },

    #[error("Negative count {value} for {key} in {port}")]
    NegativeCount {
        port: &'static str,
        key: String,
        value: i64,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Ribosome id space exhausted")]
    IdExhausted,

    #[error(transparent)]
    Ribosome(#[from] RibosomeError),
}

// ============================================================================
// Ports
// ============================================================================

/// Keys tracked on each port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortsSchema {
    pub molecules: Vec<String>,
    pub transcripts: Vec<String>,
    pub proteins: Vec<String>,
    pub concentrations: Vec<String>,
}

// ============================================================================
// Process
// ============================================================================

/// Stochastic translation process
///
/// Owns the validated configuration, the initiation sampler, the generator
/// and the carry-over state. The live ribosome set belongs to the caller's
/// snapshot; the process only keeps it for the duration of a call.
pub struct Translation {
    config: ValidatedConfig,
    source: TranslationConfig,
    network: ReactionNetwork,
    sampler: Box<dyn EventSampler>,
    rng: RngManager,

    /// Next id to issue; always above every id seen so far
    next_ribosome_id: RibosomeId,

    /// Elongation progress carried into the next call
    elongation_offset: f64,

    /// Events of the most recent call
    event_log: EventLog,
}

impl std::fmt::Debug for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translation")
            .field("transcripts", &self.config.order)
            .field("elongation_rate", &self.config.elongation_rate)
            .field("next_ribosome_id", &self.next_ribosome_id)
            .field("elongation_offset", &self.elongation_offset)
            .finish_non_exhaustive()
    }
}

/// Mutable state of one call
struct CallState<'a> {
    config: &'a ValidatedConfig,
    network: &'a ReactionNetwork,
    sampler: &'a mut dyn EventSampler,
    rng: RngManager,
    next_id: RibosomeId,
    live: RibosomeTable,
    copies: Vec<i64>,
    limits: Vec<i64>,
    unbound: i64,
    log: EventLog,
    initiations: usize,
    terminations: usize,
    unoccluded: usize,
    max_overbound: i64,
}

impl Translation {
    /// Build a process sampling initiation with the Gillespie direct method
    pub fn new(config: TranslationConfig) -> Result<Self, ConfigError> {
        let validated = config.validate()?;
        let sampler = GillespieSampler::new(ReactionNetwork::new(validated.transcript_count()));
        Ok(Self::assemble(config, validated, Box::new(sampler)))
    }

    /// Build a process with a custom initiation sampler
    pub fn with_sampler(
        config: TranslationConfig,
        sampler: Box<dyn EventSampler>,
    ) -> Result<Self, ConfigError> {
        let validated = config.validate()?;
        Ok(Self::assemble(config, validated, sampler))
    }

    /// Rebuild a process from a checkpoint taken with the same configuration
    pub fn from_checkpoint(
        config: TranslationConfig,
        checkpoint: &ProcessCheckpoint,
    ) -> Result<Self, CheckpointError> {
        let mut process = Self::new(config)?;
        checkpoint.validate(&compute_config_hash(&process.source)?)?;

        process.next_ribosome_id = checkpoint.next_ribosome_id;
        process.elongation_offset = checkpoint.elongation_offset;
        process.rng = checkpoint.rng.clone();
        Ok(process)
    }

    fn assemble(
        source: TranslationConfig,
        config: ValidatedConfig,
        sampler: Box<dyn EventSampler>,
    ) -> Self {
        log::info!(
            "translation process: {} transcripts on {} operons, {} proteins, rate {}, occlusion {}, seed {}",
            config.transcript_count(),
            config.operons.len(),
            config.protein_ids.len(),
            config.elongation_rate,
            config.polymerase_occlusion,
            config.rng_seed,
        );

        Self {
            rng: RngManager::new(config.rng_seed),
            network: ReactionNetwork::new(config.transcript_count()),
            config,
            source,
            sampler,
            next_ribosome_id: 1,
            elongation_offset: 0.0,
            event_log: EventLog::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Default call duration
    pub fn time_step(&self) -> f64 {
        self.config.time_step
    }

    /// Transcript keys in canonical order
    pub fn transcript_order(&self) -> &[TranscriptKey] {
        &self.config.order
    }

    pub fn monomer_ids(&self) -> &[String] {
        &self.config.monomer_ids
    }

    /// Every product any terminator releases, sorted
    pub fn protein_ids(&self) -> &[String] {
        &self.config.protein_ids
    }

    /// The configuration this process was built from
    pub fn config(&self) -> &TranslationConfig {
        &self.source
    }

    /// Events of the most recent call
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn elongation_offset(&self) -> f64 {
        self.elongation_offset
    }

    pub fn ports_schema(&self) -> PortsSchema {
        let mut molecules = self.config.monomer_ids.clone();
        molecules.extend([ATP_KEY.to_string(), ADP_KEY.to_string()]);

        let mut concentrations = self.config.concentration_keys.clone();
        concentrations.extend(self.config.protein_ids.iter().cloned());

        let mut proteins = concentrations.clone();
        proteins.push(UNBOUND_RIBOSOME_KEY.to_string());

        PortsSchema {
            molecules,
            transcripts: self
                .config
                .operons
                .iter()
                .map(|(operon, _)| operon.clone())
                .collect(),
            proteins,
            concentrations,
        }
    }

    /// Export the carry-over state
    pub fn checkpoint(&self) -> Result<ProcessCheckpoint, CheckpointError> {
        Ok(ProcessCheckpoint {
            next_ribosome_id: self.next_ribosome_id,
            elongation_offset: self.elongation_offset,
            rng: self.rng.clone(),
            config_hash: compute_config_hash(&self.source)?,
        })
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Run one call with the configured default duration
    pub fn next_update_default(
        &mut self,
        states: &ProcessStates,
    ) -> Result<TranslationUpdate, TranslationError> {
        self.next_update(self.config.time_step, states)
    }

    /// Simulate `timestep` time units starting from `states`
    ///
    /// Returns the update the framework should apply. On error nothing in
    /// the process has changed.
    pub fn next_update(
        &mut self,
        timestep: f64,
        states: &ProcessStates,
    ) -> Result<TranslationUpdate, TranslationError> {
        if !timestep.is_finite() || timestep < 0.0 {
            return Err(TranslationError::InvalidTimestep(timestep));
        }

        let (live, original) = self.load_ribosomes(states)?;
        let limits = self.load_molecules(states)?;
        let copies = self.load_copies(states)?;
        let initial_unbound = states.unbound_ribosomes();
        if initial_unbound < 0 {
            return Err(negative("proteins", UNBOUND_RIBOSOME_KEY, initial_unbound));
        }

        // The call works on copies so an error leaves the process untouched
        let above_original = match original.last() {
            Some(id) => id.checked_add(1).ok_or(TranslationError::IdExhausted)?,
            None => 1,
        };
        let next_id = self.next_ribosome_id.max(above_original);
        let config = &self.config;
        let mut call = CallState {
            config,
            network: &self.network,
            sampler: self.sampler.as_mut(),
            rng: self.rng.clone(),
            next_id,
            live,
            copies,
            limits,
            unbound: initial_unbound,
            log: EventLog::new(),
            initiations: 0,
            terminations: 0,
            unoccluded: 0,
            max_overbound: 0,
        };

        let mut elongation = Elongation::new(
            &config.sequences,
            &config.templates,
            &config.monomer_ids,
            config.elongation_rate,
            self.elongation_offset,
        );

        let grain = 1.0 / config.elongation_rate;
        let full_steps = (timestep * config.elongation_rate + STEP_EPSILON).floor() as u64;
        let remainder = timestep - full_steps as f64 * grain;

        let mut iterations = 0u64;
        for step in 0..full_steps {
            call.iterate(&mut elongation, step as f64 * grain, grain)?;
            iterations += 1;
        }
        if remainder > STEP_EPSILON {
            call.iterate(&mut elongation, full_steps as f64 * grain, remainder)?;
            iterations += 1;
        }

        let consumed = elongation.consumed();
        let total_consumed = elongation.total_consumed();
        let carry = elongation.carry();
        let complete_polymers = elongation.into_complete_polymers();

        log::debug!(
            "translation call: T={} iterations={} initiations={} unocclusions={} terminations={} monomers={} unbound {}->{}",
            timestep,
            iterations,
            call.initiations,
            call.unoccluded,
            call.terminations,
            total_consumed,
            initial_unbound,
            call.unbound,
        );
        if call.max_overbound > 0 {
            log::debug!(
                "translation call: snapshot held up to {} more occluding ribosomes than transcript copies",
                call.max_overbound
            );
        }

        let update = assemble_update(CallOutcome {
            original: &original,
            live: call.live,
            monomer_ids: &config.monomer_ids,
            consumed,
            protein_ids: &config.protein_ids,
            complete_polymers,
            unbound_delta: call.unbound - initial_unbound,
        });

        self.rng = call.rng;
        self.next_ribosome_id = call.next_id;
        self.elongation_offset = carry;
        self.event_log = call.log;

        Ok(update)
    }

    // ========================================================================
    // Snapshot loading
    // ========================================================================

    /// Validate the incoming ribosome records and build the live table
    fn load_ribosomes(
        &self,
        states: &ProcessStates,
    ) -> Result<(RibosomeTable, BTreeSet<RibosomeId>), TranslationError> {
        let mut live = RibosomeTable::new();
        let mut original = BTreeSet::new();

        for (&key, record) in &states.ribosomes {
            if record.id() != key {
                return Err(TranslationError::IdMismatch { key, id: record.id() });
            }
            original.insert(key);

            let index = self.config.transcript_index(record.template()).ok_or_else(|| {
                TranslationError::UnknownTranscript {
                    id: key,
                    template: record.template().clone(),
                }
            })?;

            // Already finished: leaves the live set and is reported as deleted
            if record.is_terminated() {
                continue;
            }

            let template = &self.config.templates[index];
            let terminator = template.terminator(record.terminator()).ok_or(
                TranslationError::TerminatorOutOfRange {
                    id: key,
                    terminator: record.terminator(),
                    count: template.terminators.len(),
                },
            )?;
            if record.position() >= terminator.position {
                return Err(TranslationError::PositionOutOfRange {
                    id: key,
                    position: record.position(),
                    limit: terminator.position,
                });
            }

            let state = match record.state() {
                RibosomeState::Bound => RibosomeState::Polymerizing,
                other => other,
            };
            live.insert(Ribosome::from_snapshot(
                key,
                record.template().clone(),
                index,
                record.position(),
                record.terminator(),
                state,
            ))?;
        }

        Ok((live, original))
    }

    /// Available count per monomer, in `monomer_ids` order
    ///
    /// Only monomers are checked; cofactors are bookkeeping and may go negative.
    fn load_molecules(&self, states: &ProcessStates) -> Result<Vec<i64>, TranslationError> {
        self.config
            .monomer_ids
            .iter()
            .map(|id| match states.molecules.get(id).copied().unwrap_or(0) {
                value if value < 0 => Err(negative("molecules", id, value)),
                value => Ok(value),
            })
            .collect()
    }

    /// Copy number per transcript, in canonical order
    fn load_copies(&self, states: &ProcessStates) -> Result<Vec<i64>, TranslationError> {
        for (key, &value) in &states.transcripts {
            if value < 0 {
                return Err(negative("transcripts", key, value));
            }
        }

        Ok(transcripts_to_gene_counts(
            &states.transcripts,
            &self.config.order,
        ))
    }
}

impl CallState<'_> {
    /// One iteration of the loop covering `[start, start + interval]`
    fn iterate(
        &mut self,
        elongation: &mut Elongation<'_>,
        start: f64,
        interval: f64,
    ) -> Result<(), TranslationError> {
        let n = self.config.transcript_count();
        let end = start + interval;

        let terminated = elongation.step(
            interval,
            end,
            &mut self.limits,
            &mut self.live,
            &mut self.rng,
            &mut self.log,
        )?;
        self.terminations += terminated.len();
        self.unbound += terminated.len() as i64;

        let mut bound = self.live.occluding_counts(n);
        let mut free = Vec::with_capacity(n);
        for (copies, bound) in self.copies.iter().zip(&bound) {
            self.max_overbound = self.max_overbound.max(bound - copies);
            free.push((copies - bound).max(0));
        }

        let substrate = self.network.substrate(&free, &bound, self.unbound);

        let events = self
            .sampler
            .evolve(interval, &substrate, &self.config.affinities, &mut self.rng);

        for event in events {
            let index = event.transcript_index;
            if index >= n || free[index] <= 0 || self.unbound <= 0 {
                return Err(TranslationError::InvariantViolation(format!(
                    "infeasible binding on transcript index {} at t={} (unbound {})",
                    index,
                    start + event.time,
                    self.unbound
                )));
            }
            if !(0.0..=interval + STEP_EPSILON).contains(&event.time) {
                return Err(TranslationError::InvariantViolation(format!(
                    "binding time {} outside interval {}",
                    event.time, interval
                )));
            }
            free[index] -= 1;
            bound[index] += 1;
            self.unbound -= 1;

            let id = self.next_id;
            self.next_id = id.checked_add(1).ok_or(TranslationError::IdExhausted)?;
            let template = self.config.order[index].clone();
            let mut ribosome = Ribosome::new(id, template.clone(), index);
            ribosome.start_polymerizing()?;
            self.live.insert(ribosome)?;
            self.initiations += 1;

            self.log.log(TranslationEvent::Initiation {
                time: start + event.time,
                ribosome_id: id,
                transcript: template,
            });
        }

        let occlusion = self.config.polymerase_occlusion;
        for ribosome in self.live.iter_mut() {
            if !ribosome.is_unoccluding(occlusion) {
                continue;
            }
            ribosome.unocclude()?;
            bound[ribosome.template_index()] -= 1;
            self.unoccluded += 1;
            self.log.log(TranslationEvent::Unocclusion {
                time: end,
                ribosome_id: ribosome.id(),
                transcript: ribosome.template().clone(),
                position: ribosome.position(),
            });
        }

        if bound != self.live.occluding_counts(n) {
            return Err(TranslationError::InvariantViolation(format!(
                "bound counts {:?} disagree with occluding ribosomes at t={}",
                bound, end
            )));
        }

        Ok(())
    }
}

fn negative(port: &'static str, key: &str, value: i64) -> TranslationError {
    TranslationError::NegativeCount {
        port,
        key: key.to_string(),
        value,
    }
}
