//! Live ribosome table
//!
//! Dense storage of fixed-shape ribosome records, kept sorted by id. New
//! ribosomes always receive an id above every issued id, so initiation is an
//! append; termination removes records in one ordered sweep. Iteration order
//! is ascending id, which fixes the order in which ribosomes claim scarce
//! monomers.

use crate::models::ribosome::{Ribosome, RibosomeError, RibosomeId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RibosomeTable {
    slots: Vec<Ribosome>,
}

impl RibosomeTable {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Build a table from records in any order
    pub fn from_ribosomes(
        ribosomes: impl IntoIterator<Item = Ribosome>,
    ) -> Result<Self, RibosomeError> {
        let mut table = Self::new();
        for ribosome in ribosomes {
            table.insert(ribosome)?;
        }
        Ok(table)
    }

    /// Insert a ribosome, keeping id order
    pub fn insert(&mut self, ribosome: Ribosome) -> Result<(), RibosomeError> {
        match self.slots.last() {
            None => self.slots.push(ribosome),
            Some(last) if last.id() < ribosome.id() => self.slots.push(ribosome),
            Some(_) => match self.locate(ribosome.id()) {
                Ok(_) => return Err(RibosomeError::DuplicateId(ribosome.id())),
                Err(slot) => self.slots.insert(slot, ribosome),
            },
        }
        Ok(())
    }

    pub fn get(&self, id: RibosomeId) -> Option<&Ribosome> {
        self.locate(id).ok().map(|slot| &self.slots[slot])
    }

    pub fn get_mut(&mut self, id: RibosomeId) -> Option<&mut Ribosome> {
        match self.locate(id) {
            Ok(slot) => Some(&mut self.slots[slot]),
            Err(_) => None,
        }
    }

    pub fn contains(&self, id: RibosomeId) -> bool {
        self.locate(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ribosome> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ribosome> {
        self.slots.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = RibosomeId> + '_ {
        self.slots.iter().map(Ribosome::id)
    }

    /// Highest id in the table
    pub fn max_id(&self) -> Option<RibosomeId> {
        self.slots.last().map(Ribosome::id)
    }

    /// Remove every terminated ribosome, returning them in id order
    pub fn remove_terminated(&mut self) -> Vec<Ribosome> {
        if !self.slots.iter().any(Ribosome::is_terminated) {
            return Vec::new();
        }

        let (terminated, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.slots)
            .into_iter()
            .partition(Ribosome::is_terminated);
        self.slots = live;
        terminated
    }

    /// Number of occluding ribosomes per canonical transcript index
    pub fn occluding_counts(&self, transcript_count: usize) -> Vec<i64> {
        let mut counts = vec![0; transcript_count];
        for ribosome in self.slots.iter().filter(|r| r.is_occluding()) {
            if let Some(count) = counts.get_mut(ribosome.template_index()) {
                *count += 1;
            }
        }
        counts
    }

    pub fn into_vec(self) -> Vec<Ribosome> {
        self.slots
    }

    fn locate(&self, id: RibosomeId) -> Result<usize, usize> {
        self.slots.binary_search_by_key(&id, Ribosome::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transcript::TranscriptKey;

    fn ribosome(id: RibosomeId, index: usize) -> Ribosome {
        Ribosome::new(id, TranscriptKey::new("oA", "eA"), index)
    }

    #[test]
    fn test_insert_keeps_id_order() {
        let table =
            RibosomeTable::from_ribosomes(vec![ribosome(5, 0), ribosome(2, 0), ribosome(9, 0)])
                .unwrap();

        let ids: Vec<_> = table.ids().collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert_eq!(table.max_id(), Some(9));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = RibosomeTable::from_ribosomes(vec![ribosome(3, 0), ribosome(3, 0)]);
        assert_eq!(result.unwrap_err(), RibosomeError::DuplicateId(3));
    }

    #[test]
    fn test_remove_terminated_preserves_order() {
        let mut table = RibosomeTable::new();
        for id in 1..=4 {
            let mut r = ribosome(id, 0);
            r.start_polymerizing().unwrap();
            table.insert(r).unwrap();
        }
        table.get_mut(2).unwrap().terminate().unwrap();
        table.get_mut(4).unwrap().terminate().unwrap();

        let removed: Vec<_> = table.remove_terminated().iter().map(Ribosome::id).collect();
        assert_eq!(removed, vec![2, 4]);
        assert_eq!(table.ids().collect::<Vec<_>>(), vec![1, 3]);
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_occluding_counts_by_template_index() {
        let mut table = RibosomeTable::new();
        table.insert(ribosome(1, 0)).unwrap();
        table.insert(ribosome(2, 2)).unwrap();
        let mut unoccluded = ribosome(3, 2);
        unoccluded.start_polymerizing().unwrap();
        unoccluded.unocclude().unwrap();
        table.insert(unoccluded).unwrap();

        assert_eq!(table.occluding_counts(3), vec![1, 0, 1]);
    }
}
