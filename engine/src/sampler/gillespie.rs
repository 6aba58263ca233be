//! Direct-method Gillespie sampler over the initiation network

use super::{BindingEvent, EventSampler};
use crate::network::ReactionNetwork;
use crate::rng::RngManager;

/// Exact stochastic simulation of the initiation network
///
/// Draws exponential waiting times from the total propensity and picks the
/// firing reaction proportionally to its propensity, applying the
/// stoichiometry to a private copy of the state so later events in the same
/// interval see depleted free copies and ribosomes.
#[derive(Debug, Clone)]
pub struct GillespieSampler {
    network: ReactionNetwork,
    propensities: Vec<f64>,
}

impl GillespieSampler {
    pub fn new(network: ReactionNetwork) -> Self {
        let propensities = Vec::with_capacity(network.reaction_count());
        Self {
            network,
            propensities,
        }
    }
}

impl EventSampler for GillespieSampler {
    fn evolve(
        &mut self,
        interval: f64,
        substrate: &[i64],
        rates: &[f64],
        rng: &mut RngManager,
    ) -> Vec<BindingEvent> {
        let mut events = Vec::new();
        if interval <= 0.0 {
            return events;
        }

        let mut state = substrate.to_vec();
        let mut now = 0.0;

        loop {
            self.network
                .propensities(rates, &state, &mut self.propensities);
            let total: f64 = self.propensities.iter().sum();
            if total <= 0.0 {
                break;
            }

            let tau = rng.exponential(total);
            if now + tau > interval {
                break;
            }
            now += tau;

            let Some(reaction) = rng.choose_weighted(&self.propensities) else {
                break;
            };
            self.network.fire(reaction, &mut state);
            events.push(BindingEvent {
                time: now,
                transcript_index: reaction,
            });
        }

        events
    }
}
