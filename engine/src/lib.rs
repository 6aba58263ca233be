//! Stochastic Translation - Rust Engine
//!
//! Timestep-update kernel simulating ribosomes that bind transcripts,
//! elongate along them consuming monomers and release finished proteins.
//!
//! # Architecture
//!
//! - **models**: Domain types (TranscriptKey, Template, Ribosome, EventLog)
//! - **network**: Affinity vector and initiation reaction network
//! - **sampler**: Stochastic initiation sampling (Gillespie direct method)
//! - **elongation**: Deterministic, monomer-limited elongation stepper
//! - **orchestrator**: Configuration, simulation loop, update assembly
//! - **rng**: Deterministic random number generation
//! - **data**: Default amino acid alphabet
//!
//! # Critical Invariants
//!
//! 1. `free + bound == copies` for every transcript at every iteration boundary
//! 2. Monomers consumed == ATP spent / 2 == ADP produced / 2
//! 3. All randomness is deterministic (seeded RNG owned by the process)

// Module declarations
pub mod data;
pub mod elongation;
pub mod models;
pub mod network;
pub mod orchestrator;
pub mod rng;
pub mod sampler;

// Re-exports for convenience
pub use models::{
    event::{EventLog, TranslationEvent},
    ribosome::{Ribosome, RibosomeError, RibosomeId, RibosomeState, UNBOUND_RIBOSOME_KEY},
    table::RibosomeTable,
    transcript::{
        all_products, gather_genes, generate_template, transcripts_to_gene_counts, Template,
        Terminator, TranscriptKey,
    },
};
pub use network::{NetworkError, ReactionNetwork};
pub use orchestrator::{
    CheckpointError, ConfigError, PortsSchema, ProcessCheckpoint, ProcessStates,
    TranscriptAffinity, Translation, TranslationConfig, TranslationError, TranslationUpdate,
};
pub use rng::RngManager;
pub use sampler::{BindingEvent, EventSampler, GillespieSampler};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn stochastic_translation_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::process::PyTranslation>()?;
    Ok(())
}
