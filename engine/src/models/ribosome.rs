//! Ribosome model
//!
//! A ribosome is created the moment a binding event is sampled and lives
//! until it reaches a terminator that stops it. Lifecycle:
//!
//! ```text
//! new() ──> Bound ──start_polymerizing()──> Polymerizing ──unocclude()──> Unoccluded
//!                                                │                             │
//!                                                └────────terminate()──────────┴──> Terminated
//! ```
//!
//! While `Bound` or `Polymerizing` the ribosome still sits over its
//! transcript's binding site (it is *occluding*): no other ribosome can
//! initiate on that copy. Once it has travelled the occlusion window it is
//! `Unoccluded` and keeps translating without blocking new initiations.

use crate::models::transcript::TranscriptKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique, monotonically increasing ribosome identifier
pub type RibosomeId = u64;

/// Key under which the unbound-ribosome pool is counted in the proteins port
pub const UNBOUND_RIBOSOME_KEY: &str = "Ribosome";

/// Ribosome lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RibosomeState {
    /// Just attached to a free binding site
    Bound,

    /// Translating and still occluding its binding site
    Polymerizing,

    /// Translating past the occlusion window; binding site released
    Unoccluded,

    /// Finished; removed from the live set within the same call
    Terminated,
}

/// Errors from illegal ribosome operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RibosomeError {
    #[error("Ribosome {id} cannot {action} while {state:?}")]
    InvalidTransition {
        id: RibosomeId,
        action: &'static str,
        state: RibosomeState,
    },

    #[error("Ribosome {0} already present")]
    DuplicateId(RibosomeId),
}

/// One ribosome attached to a transcript
///
/// # Example
/// ```
/// use stochastic_translation_rs::{Ribosome, RibosomeState, TranscriptKey};
///
/// let mut ribosome = Ribosome::new(1, TranscriptKey::new("oA", "eA"), 0);
/// assert_eq!(ribosome.state(), RibosomeState::Bound);
///
/// ribosome.start_polymerizing().unwrap();
/// assert!(ribosome.is_occluding());
/// assert!(ribosome.is_polymerizing());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ribosome {
    id: RibosomeId,

    /// Transcript being translated
    template: TranscriptKey,

    /// Index of `template` in the process's canonical transcript order
    template_index: usize,

    /// Monomers incorporated so far
    position: usize,

    /// Index of the next terminator this ribosome will reach
    #[serde(default)]
    terminator: usize,

    state: RibosomeState,
}

impl Ribosome {
    /// Create a freshly bound ribosome at position 0
    pub fn new(id: RibosomeId, template: TranscriptKey, template_index: usize) -> Self {
        Self {
            id,
            template,
            template_index,
            position: 0,
            terminator: 0,
            state: RibosomeState::Bound,
        }
    }

    /// Rebuild a ribosome from a snapshot record
    pub fn from_snapshot(
        id: RibosomeId,
        template: TranscriptKey,
        template_index: usize,
        position: usize,
        terminator: usize,
        state: RibosomeState,
    ) -> Self {
        Self {
            id,
            template,
            template_index,
            position,
            terminator,
            state,
        }
    }

    pub fn id(&self) -> RibosomeId {
        self.id
    }

    pub fn template(&self) -> &TranscriptKey {
        &self.template
    }

    pub fn template_index(&self) -> usize {
        self.template_index
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn terminator(&self) -> usize {
        self.terminator
    }

    pub fn state(&self) -> RibosomeState {
        self.state
    }

    /// Still blocking its binding site
    pub fn is_occluding(&self) -> bool {
        matches!(self.state, RibosomeState::Bound | RibosomeState::Polymerizing)
    }

    /// Advances during elongation
    pub fn is_polymerizing(&self) -> bool {
        matches!(
            self.state,
            RibosomeState::Polymerizing | RibosomeState::Unoccluded
        )
    }

    pub fn is_terminated(&self) -> bool {
        self.state == RibosomeState::Terminated
    }

    /// True exactly when the ribosome is occluding and has cleared `occlusion`
    pub fn is_unoccluding(&self, occlusion: usize) -> bool {
        self.state == RibosomeState::Polymerizing && self.position >= occlusion
    }

    /// Bound → Polymerizing
    pub fn start_polymerizing(&mut self) -> Result<(), RibosomeError> {
        self.transition(RibosomeState::Bound, RibosomeState::Polymerizing, "start polymerizing")
    }

    /// Polymerizing → Unoccluded
    pub fn unocclude(&mut self) -> Result<(), RibosomeError> {
        self.transition(RibosomeState::Polymerizing, RibosomeState::Unoccluded, "unocclude")
    }

    /// Polymerizing/Unoccluded → Terminated
    pub fn terminate(&mut self) -> Result<(), RibosomeError> {
        if !self.is_polymerizing() {
            return Err(self.invalid("terminate"));
        }
        self.state = RibosomeState::Terminated;
        Ok(())
    }

    /// Incorporate one monomer
    pub(crate) fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip the current terminator and head for the next one
    pub(crate) fn read_through(&mut self) {
        self.terminator += 1;
    }

    fn transition(
        &mut self,
        from: RibosomeState,
        to: RibosomeState,
        action: &'static str,
    ) -> Result<(), RibosomeError> {
        if self.state != from {
            return Err(self.invalid(action));
        }
        self.state = to;
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> RibosomeError {
        RibosomeError::InvalidTransition {
            id: self.id,
            action,
            state: self.state,
        }
    }
}
