//! Domain models for the translation kernel

pub mod event;
pub mod ribosome;
pub mod table;
pub mod transcript;

// Re-exports
pub use event::{EventLog, TranslationEvent};
pub use ribosome::{Ribosome, RibosomeError, RibosomeId, RibosomeState, UNBOUND_RIBOSOME_KEY};
pub use table::RibosomeTable;
pub use transcript::{Template, Terminator, TranscriptKey};
