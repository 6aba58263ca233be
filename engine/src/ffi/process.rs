//! PyO3 wrapper for the translation process

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::orchestrator::{
    ProcessCheckpoint, ProcessStates, Translation as RustTranslation, TranslationConfig,
};

/// Python wrapper for the Rust translation process
///
/// # Example (from Python)
///
/// ```python
/// from stochastic_translation_rs import Translation
///
/// process = Translation("{}")  # default configuration
/// update = json.loads(process.next_update(1.0, json.dumps(states)))
/// ```
#[pyclass(name = "Translation")]
pub struct PyTranslation {
    inner: RustTranslation,
}

fn value_error(context: &str, e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyValueError, _>(format!("{}: {}", context, e))
}

fn runtime_error(context: &str, e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyRuntimeError, _>(format!("{}: {}", context, e))
}

#[pymethods]
impl PyTranslation {
    /// Create a process from a JSON configuration
    ///
    /// Missing fields take their defaults; `"{}"` builds the default process.
    ///
    /// # Errors
    ///
    /// Raises ValueError if the configuration cannot be parsed or fails
    /// validation.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let config = TranslationConfig::from_json(config_json)
            .map_err(|e| value_error("Invalid configuration", e))?;
        let inner = RustTranslation::new(config)
            .map_err(|e| value_error("Failed to create translation process", e))?;
        Ok(PyTranslation { inner })
    }

    /// Restore a process from a configuration and a checkpoint
    #[staticmethod]
    fn from_checkpoint(config_json: &str, checkpoint_json: &str) -> PyResult<Self> {
        let config = TranslationConfig::from_json(config_json)
            .map_err(|e| value_error("Invalid configuration", e))?;
        let checkpoint = ProcessCheckpoint::from_json(checkpoint_json)
            .map_err(|e| value_error("Invalid checkpoint", e))?;
        let inner = RustTranslation::from_checkpoint(config, &checkpoint)
            .map_err(|e| value_error("Failed to restore translation process", e))?;
        Ok(PyTranslation { inner })
    }

    /// Run one call and return the update as JSON
    ///
    /// # Arguments
    ///
    /// * `timestep` - Duration to simulate
    /// * `states_json` - Snapshot with `ribosomes`, `molecules`,
    ///   `transcripts` and `proteins`
    fn next_update(&mut self, timestep: f64, states_json: &str) -> PyResult<String> {
        let states = ProcessStates::from_json(states_json)
            .map_err(|e| value_error("Invalid states", e))?;
        let update = self
            .inner
            .next_update(timestep, &states)
            .map_err(|e| runtime_error("Translation failed", e))?;
        serde_json::to_string(&update).map_err(|e| runtime_error("Serialization failed", e))
    }

    /// Default call duration
    fn time_step(&self) -> f64 {
        self.inner.time_step()
    }

    /// Tracked keys per port, as JSON
    fn ports_schema(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.ports_schema())
            .map_err(|e| runtime_error("Serialization failed", e))
    }

    /// Carry-over state, as JSON
    fn checkpoint(&self) -> PyResult<String> {
        self.inner
            .checkpoint()
            .and_then(|checkpoint| checkpoint.to_json())
            .map_err(|e| runtime_error("Checkpoint failed", e))
    }

    /// Events of the most recent call, as JSON
    fn event_log_json(&self) -> PyResult<String> {
        serde_json::to_string(self.inner.event_log())
            .map_err(|e| runtime_error("Serialization failed", e))
    }
}
