//! Authoritative screw storage
//!
//! Plates and the slot row only hold `ScrewId`s into this store.

use super::entities::{Screw, ScrewId};

/// Screws sorted by id for deterministic iteration
#[derive(Debug, Clone, Default)]
pub struct ScrewStore {
    screws: Vec<Screw>,
}

impl ScrewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a screw, keeping id order
    pub fn insert(&mut self, screw: Screw) {
        match self.screws.binary_search_by_key(&screw.id, |s| s.id) {
            Ok(index) => self.screws[index] = screw,
            Err(index) => self.screws.insert(index, screw),
        }
    }

    pub fn get(&self, id: ScrewId) -> Option<&Screw> {
        self.screws
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|index| &self.screws[index])
    }

    pub fn get_mut(&mut self, id: ScrewId) -> Option<&mut Screw> {
        self.screws
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(move |index| &mut self.screws[index])
    }

    /// Destroy a screw
    pub fn remove(&mut self, id: ScrewId) -> Option<Screw> {
        self.screws
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|index| self.screws.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Screw> {
        self.screws.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Screw> {
        self.screws.iter_mut()
    }

    /// Snapshot of live ids (safe to iterate while removing)
    pub fn ids(&self) -> Vec<ScrewId> {
        self.screws.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.screws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screws.is_empty()
    }

    /// Screws still attached to a plate
    pub fn unslotted_count(&self) -> usize {
        self.screws.iter().filter(|s| !s.in_slot).count()
    }

    pub fn clear(&mut self) {
        self.screws.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::ScrewColor;
    use glam::Vec2;

    fn screw(id: ScrewId) -> Screw {
        Screw::new(id, 0, Vec2::ZERO, ScrewColor::Red, 20.0)
    }

    #[test]
    fn test_insert_keeps_id_order() {
        let mut store = ScrewStore::new();
        store.insert(screw(3));
        store.insert(screw(1));
        store.insert(screw(2));
        assert_eq!(store.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_and_lookup() {
        let mut store = ScrewStore::new();
        for id in 1..=4 {
            store.insert(screw(id));
        }
        assert!(store.remove(2).is_some());
        assert!(store.get(2).is_none());
        assert!(store.remove(2).is_none());
        assert_eq!(store.get(3).map(|s| s.id), Some(3));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unslotted_count() {
        let mut store = ScrewStore::new();
        for id in 1..=3 {
            store.insert(screw(id));
        }
        store.get_mut(1).unwrap().in_slot = true;
        assert_eq!(store.unslotted_count(), 2);
    }
}
