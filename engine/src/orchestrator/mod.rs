//! Orchestrator - the translation process and its per-call plumbing
//!
//! See `engine.rs` for the simulation loop.

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod states;
pub mod update;

// Re-export main types for convenience
pub use checkpoint::{compute_config_hash, CheckpointError, ProcessCheckpoint};
pub use config::{ConfigError, TranscriptAffinity, TranslationConfig};
pub use engine::{PortsSchema, Translation, TranslationError};
pub use states::ProcessStates;
pub use update::{RibosomeAdd, RibosomeUpdate, TranslationUpdate, ADP_KEY, ATP_KEY};
