//! Stochastic initiation sampling
//!
//! The simulation loop asks a sampler which binding events happen during
//! one interval. The contract:
//!
//! - the returned events are ordered by time, every time in `[0, interval]`
//! - every `transcript_index` indexes the canonical transcript order
//! - the caller's substrate vector is not modified; the sampler evolves
//!   its own copy and the caller rebuilds the substrate before each call
//! - no events is a normal answer (short intervals usually have none)

mod gillespie;

pub use gillespie::GillespieSampler;

use crate::rng::RngManager;

/// One sampled initiation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingEvent {
    /// Time since the start of the interval
    pub time: f64,

    /// Canonical index of the transcript that was bound
    pub transcript_index: usize,
}

/// Source of initiation events for the simulation loop
pub trait EventSampler: Send {
    /// Sample the binding events occurring within `interval`
    ///
    /// # Arguments
    /// * `interval` - Length of the interval to evolve
    /// * `substrate` - `[free.., bound.., unbound_ribosomes]`
    /// * `rates` - Affinity of each transcript, canonical order
    /// * `rng` - The process generator
    fn evolve(
        &mut self,
        interval: f64,
        substrate: &[i64],
        rates: &[f64],
        rng: &mut RngManager,
    ) -> Vec<BindingEvent>;
}
