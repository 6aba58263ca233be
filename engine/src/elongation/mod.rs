//! Elongation stepper
//!
//! Advances every translating ribosome one monomer per `1 / elongation_rate`
//! time units, consuming one unit of the monomer at the ribosome's current
//! sequence position. A ribosome whose next monomer is exhausted stalls for
//! that step; other ribosomes and other monomer types carry on. Ribosomes
//! are served in ascending id order, so under scarcity older ribosomes win.
//!
//! Progress is accumulated in monomer units and every whole unit becomes one
//! step. An interval too short to complete a unit (a partial step) only
//! accumulates: no consumption, no termination check. Whatever has not been
//! converted is handed back by [`Elongation::carry`], always in `[0, 1)`, and
//! seeds the next call, so the elongation rate holds exactly however the
//! caller slices time.

use crate::models::event::{EventLog, TranslationEvent};
use crate::models::ribosome::{Ribosome, RibosomeError};
use crate::models::table::RibosomeTable;
use crate::models::transcript::Template;
use crate::rng::RngManager;
use std::collections::BTreeMap;

/// Tolerance when converting accumulated progress into whole steps
pub const STEP_EPSILON: f64 = 1e-9;

/// Per-call elongation state
#[derive(Debug)]
pub struct Elongation<'a> {
    /// Monomer index at every position, per canonical transcript
    sequences: &'a [Vec<usize>],

    /// Template per canonical transcript
    templates: &'a [Template],

    /// Monomer names, indexed like the pool
    monomer_ids: &'a [String],

    /// Monomers per unit time
    rate: f64,

    /// Progress (monomer units) not yet converted into steps
    progress: f64,

    /// Units consumed per monomer index during this call
    consumed: Vec<i64>,

    /// Proteins finished during this call
    complete_polymers: BTreeMap<String, i64>,

    /// Monomers already reported as blocking this call
    exhausted: Vec<bool>,
}

impl<'a> Elongation<'a> {
    pub fn new(
        sequences: &'a [Vec<usize>],
        templates: &'a [Template],
        monomer_ids: &'a [String],
        rate: f64,
        carried_progress: f64,
    ) -> Self {
        Self {
            sequences,
            templates,
            monomer_ids,
            rate,
            progress: carried_progress,
            consumed: vec![0; monomer_ids.len()],
            complete_polymers: BTreeMap::new(),
            exhausted: vec![false; monomer_ids.len()],
        }
    }

    /// Elongate for `interval`, performing every whole step it completes
    ///
    /// An interval that completes no step is a partial step.
    ///
    /// Returns the ribosomes that terminated (already removed from `ribosomes`).
    pub fn step(
        &mut self,
        interval: f64,
        now: f64,
        limits: &mut [i64],
        ribosomes: &mut RibosomeTable,
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> Result<Vec<Ribosome>, RibosomeError> {
        self.progress += interval * self.rate;
        let steps = (self.progress + STEP_EPSILON).floor();
        self.progress = (self.progress - steps).max(0.0);

        let mut terminated = Vec::new();
        for _ in 0..steps as u64 {
            terminated.extend(self.polymerize_step(now, limits, ribosomes, rng, log)?);
        }
        Ok(terminated)
    }

    /// Progress to carry into the next call
    pub fn carry(&self) -> f64 {
        self.progress
    }

    /// Non-zero consumption by monomer name
    pub fn consumed(&self) -> BTreeMap<String, i64> {
        self.monomer_ids
            .iter()
            .zip(&self.consumed)
            .filter(|(_, count)| **count > 0)
            .map(|(id, count)| (id.clone(), *count))
            .collect()
    }

    pub fn total_consumed(&self) -> i64 {
        self.consumed.iter().sum()
    }

    pub fn complete_polymers(&self) -> &BTreeMap<String, i64> {
        &self.complete_polymers
    }

    pub fn into_complete_polymers(self) -> BTreeMap<String, i64> {
        self.complete_polymers
    }

    /// Advance every translating ribosome by at most one monomer
    fn polymerize_step(
        &mut self,
        now: f64,
        limits: &mut [i64],
        ribosomes: &mut RibosomeTable,
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> Result<Vec<Ribosome>, RibosomeError> {
        let sequences = self.sequences;
        let templates = self.templates;

        for ribosome in ribosomes.iter_mut().filter(|r| r.is_polymerizing()) {
            let index = ribosome.template_index();
            let Some(&monomer) = sequences[index].get(ribosome.position()) else {
                continue;
            };

            if limits[monomer] <= 0 {
                if !self.exhausted[monomer] {
                    self.exhausted[monomer] = true;
                    log.log(TranslationEvent::MonomerExhausted {
                        time: now,
                        monomer: self.monomer_ids[monomer].clone(),
                    });
                }
                continue;
            }

            limits[monomer] -= 1;
            self.consumed[monomer] += 1;
            ribosome.advance();

            let template = &templates[index];
            let Some(terminator) = template.terminator(ribosome.terminator()) else {
                continue;
            };
            if terminator.position != ribosome.position() {
                continue;
            }

            if template.terminates_at(ribosome.terminator(), rng) {
                ribosome.terminate()?;
                for product in &terminator.products {
                    *self.complete_polymers.entry(product.clone()).or_insert(0) += 1;
                }
                log.log(TranslationEvent::Termination {
                    time: now,
                    ribosome_id: ribosome.id(),
                    transcript: ribosome.template().clone(),
                    position: ribosome.position(),
                    products: terminator.products.clone(),
                });
            } else {
                ribosome.read_through();
                log.log(TranslationEvent::ReadThrough {
                    time: now,
                    ribosome_id: ribosome.id(),
                    transcript: ribosome.template().clone(),
                    position: ribosome.position(),
                });
            }
        }

        Ok(ribosomes.remove_terminated())
    }
}
