//! Event logging for translation calls.
//!
//! Every ribosome state change the kernel makes during a call is recorded as
//! a `TranslationEvent`. The log is what a caller inspects to understand why
//! an update looks the way it does: which transcripts were initiated on,
//! when binding sites were released, where ribosomes read through a
//! terminator, and which monomers ran out.
//!
//! Times are simulated time since the start of the call.
//!
//! # Example
//!
//! ```rust
//! use stochastic_translation_rs::models::{EventLog, TranslationEvent};
//! use stochastic_translation_rs::TranscriptKey;
//!
//! let mut log = EventLog::new();
//! log.log(TranslationEvent::Initiation {
//!     time: 0.05,
//!     ribosome_id: 1,
//!     transcript: TranscriptKey::new("oA", "eA"),
//! });
//!
//! assert_eq!(log.events_of_type("Initiation").len(), 1);
//! ```

use crate::models::ribosome::RibosomeId;
use crate::models::transcript::TranscriptKey;
use serde::{Deserialize, Serialize};

/// Translation event capturing a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TranslationEvent {
    /// A ribosome bound a free transcript copy
    Initiation {
        time: f64,
        ribosome_id: RibosomeId,
        transcript: TranscriptKey,
    },

    /// A ribosome cleared the occlusion window, freeing its binding site
    Unocclusion {
        time: f64,
        ribosome_id: RibosomeId,
        transcript: TranscriptKey,
        position: usize,
    },

    /// A ribosome passed a non-final terminator without stopping
    ReadThrough {
        time: f64,
        ribosome_id: RibosomeId,
        transcript: TranscriptKey,
        position: usize,
    },

    /// A ribosome stopped at a terminator and released its products
    Termination {
        time: f64,
        ribosome_id: RibosomeId,
        transcript: TranscriptKey,
        position: usize,
        products: Vec<String>,
    },

    /// A monomer ran out and blocked incorporation (first time per call)
    MonomerExhausted { time: f64, monomer: String },
}

impl TranslationEvent {
    pub fn time(&self) -> f64 {
        match self {
            TranslationEvent::Initiation { time, .. }
            | TranslationEvent::Unocclusion { time, .. }
            | TranslationEvent::ReadThrough { time, .. }
            | TranslationEvent::Termination { time, .. }
            | TranslationEvent::MonomerExhausted { time, .. } => *time,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            TranslationEvent::Initiation { .. } => "Initiation",
            TranslationEvent::Unocclusion { .. } => "Unocclusion",
            TranslationEvent::ReadThrough { .. } => "ReadThrough",
            TranslationEvent::Termination { .. } => "Termination",
            TranslationEvent::MonomerExhausted { .. } => "MonomerExhausted",
        }
    }

    pub fn ribosome_id(&self) -> Option<RibosomeId> {
        match self {
            TranslationEvent::Initiation { ribosome_id, .. }
            | TranslationEvent::Unocclusion { ribosome_id, .. }
            | TranslationEvent::ReadThrough { ribosome_id, .. }
            | TranslationEvent::Termination { ribosome_id, .. } => Some(*ribosome_id),
            TranslationEvent::MonomerExhausted { .. } => None,
        }
    }

    pub fn transcript(&self) -> Option<&TranscriptKey> {
        match self {
            TranslationEvent::Initiation { transcript, .. }
            | TranslationEvent::Unocclusion { transcript, .. }
            | TranslationEvent::ReadThrough { transcript, .. }
            | TranslationEvent::Termination { transcript, .. } => Some(transcript),
            TranslationEvent::MonomerExhausted { .. } => None,
        }
    }
}

/// Event log for storing and querying translation events.
///
/// This is a simple wrapper around Vec<TranslationEvent> with convenience methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<TranslationEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: TranslationEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TranslationEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&TranslationEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific ribosome
    pub fn events_for_ribosome(&self, ribosome_id: RibosomeId) -> Vec<&TranslationEvent> {
        self.events
            .iter()
            .filter(|e| e.ribosome_id() == Some(ribosome_id))
            .collect()
    }

    /// Get events for a specific transcript
    pub fn events_for_transcript(&self, transcript: &TranscriptKey) -> Vec<&TranslationEvent> {
        self.events
            .iter()
            .filter(|e| e.transcript() == Some(transcript))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TranscriptKey {
        TranscriptKey::new("oAZ", "eZ")
    }

    #[test]
    fn test_event_accessors() {
        let event = TranslationEvent::Termination {
            time: 0.8,
            ribosome_id: 4,
            transcript: key(),
            position: 60,
            products: vec!["eZ".to_string()],
        };

        assert_eq!(event.time(), 0.8);
        assert_eq!(event.event_type(), "Termination");
        assert_eq!(event.ribosome_id(), Some(4));
        assert_eq!(event.transcript(), Some(&key()));
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        log.log(TranslationEvent::Initiation {
            time: 0.1,
            ribosome_id: 1,
            transcript: key(),
        });
        log.log(TranslationEvent::Initiation {
            time: 0.15,
            ribosome_id: 2,
            transcript: TranscriptKey::new("oA", "eA"),
        });
        log.log(TranslationEvent::Unocclusion {
            time: 2.2,
            ribosome_id: 1,
            transcript: key(),
            position: 10,
        });
        log.log(TranslationEvent::MonomerExhausted {
            time: 2.4,
            monomer: "Tryptophan".to_string(),
        });

        assert_eq!(log.len(), 4);
        assert_eq!(log.events_of_type("Initiation").len(), 2);
        assert_eq!(log.events_for_ribosome(1).len(), 2);
        assert_eq!(log.events_for_transcript(&key()).len(), 2);
    }

    #[test]
    fn test_event_log_clear() {
        let mut log = EventLog::new();
        log.log(TranslationEvent::MonomerExhausted {
            time: 0.0,
            monomer: "Alanine".to_string(),
        });

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = TranslationEvent::MonomerExhausted {
            time: 0.5,
            monomer: "Alanine".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "MonomerExhausted");
        assert_eq!(json["monomer"], "Alanine");
    }
}
