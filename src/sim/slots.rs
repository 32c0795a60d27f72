//! Slot row: the fixed-capacity holding area screws are tapped into
//!
//! Occupied slots are always packed at the lowest indices. A removal pass
//! frees slots and then compacts before returning.

use glam::Vec2;

use super::arena::ScrewStore;
use super::entities::{Screw, ScrewColor, ScrewId};
use crate::consts::{SLOT_SPACING, SLOT_Y};

/// One holding slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Fixed screen position a slotted screw animates to
    pub pos: Vec2,
    pub screw: Option<ScrewId>,
}

#[derive(Debug, Clone)]
pub struct SlotRow {
    slots: Vec<Slot>,
    match_count: usize,
}

/// Screen position of slot `index` in a row of `capacity` centered on `viewport_width`
pub fn slot_position(index: usize, capacity: usize, viewport_width: f32) -> Vec2 {
    let total_width = capacity as f32 * SLOT_SPACING;
    let start_x = (viewport_width - total_width) / 2.0 + SLOT_SPACING / 2.0;
    Vec2::new(start_x + index as f32 * SLOT_SPACING, SLOT_Y)
}

impl SlotRow {
    pub fn new(capacity: usize, match_count: usize, viewport_width: f32) -> Self {
        let slots = (0..capacity)
            .map(|i| Slot {
                pos: slot_position(i, capacity, viewport_width),
                screw: None,
            })
            .collect();
        // A zero threshold would match on an empty row
        let match_count = match_count.clamp(1, capacity.max(1));
        Self { slots, match_count }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Occupants in slot order
    pub fn occupants(&self) -> impl Iterator<Item = ScrewId> + '_ {
        self.slots.iter().filter_map(|s| s.screw)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupants().count()
    }

    /// Slot index holding `id`
    pub fn index_of(&self, id: ScrewId) -> Option<usize> {
        self.slots.iter().position(|s| s.screw == Some(id))
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.screw.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.screw.is_none())
    }

    /// Recenter the row for a new viewport width, retargeting occupants
    pub fn layout(&mut self, viewport_width: f32, screws: &mut ScrewStore) {
        let capacity = self.slots.len();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.pos = slot_position(index, capacity, viewport_width);
            if let Some(screw) = slot.screw.and_then(|id| screws.get_mut(id)) {
                screw.move_to(slot.pos);
            }
        }
    }

    /// Put `screw` in the lowest empty slot and start its move animation.
    /// Returns the slot index, or `None` (no change) when the row is full.
    pub fn try_place(&mut self, screw: &mut Screw) -> Option<usize> {
        let index = self.slots.iter().position(|s| s.screw.is_none())?;
        let slot = &mut self.slots[index];
        slot.screw = Some(screw.id);
        screw.move_to(slot.pos);
        screw.in_slot = true;
        Some(index)
    }

    /// First color to reach the match count, scanning slots in order
    pub fn check_match(&self, screws: &ScrewStore) -> Option<ScrewColor> {
        if self.occupied_count() < self.match_count {
            return None;
        }

        let mut counts: Vec<(ScrewColor, usize)> = Vec::with_capacity(self.slots.len());
        for screw in self.occupants().filter_map(|id| screws.get(id)) {
            let count = match counts.iter_mut().find(|(c, _)| *c == screw.color) {
                Some((_, n)) => {
                    *n += 1;
                    *n
                }
                None => {
                    counts.push((screw.color, 1));
                    1
                }
            };
            if count >= self.match_count {
                return Some(screw.color);
            }
        }
        None
    }

    /// Free up to `match_count` slots of `color` from the lowest index, then
    /// compact. Returns the removed ids; the caller destroys the entities.
    pub fn remove_matched(&mut self, color: ScrewColor, screws: &mut ScrewStore) -> Vec<ScrewId> {
        let mut removed = Vec::with_capacity(self.match_count);
        for slot in &mut self.slots {
            if removed.len() >= self.match_count {
                break;
            }
            let Some(id) = slot.screw else { continue };
            if screws.get(id).is_some_and(|s| s.color == color) {
                slot.screw = None;
                removed.push(id);
            }
        }

        self.compact(screws);
        removed
    }

    /// Free the `count` highest-indexed occupied slots, then compact.
    /// Returns the released ids.
    pub fn release_highest(&mut self, count: usize, screws: &mut ScrewStore) -> Vec<ScrewId> {
        let mut released = Vec::with_capacity(count);
        for slot in self.slots.iter_mut().rev() {
            if released.len() >= count {
                break;
            }
            if let Some(id) = slot.screw.take() {
                released.push(id);
            }
        }

        self.compact(screws);
        released
    }

    /// Repack occupants contiguously from index 0
    pub fn compact(&mut self, screws: &mut ScrewStore) {
        let occupants: Vec<ScrewId> = self.occupants().collect();
        for slot in &mut self.slots {
            slot.screw = None;
        }
        for (slot, id) in self.slots.iter_mut().zip(occupants) {
            slot.screw = Some(id);
            if let Some(screw) = screws.get_mut(id) {
                screw.move_to(slot.pos);
            }
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.screw = None;
        }
    }

    /// True when no empty slot precedes an occupied one
    pub fn is_compact(&self) -> bool {
        let occupied = self.occupied_count();
        self.slots[..occupied].iter().all(|s| s.screw.is_some())
    }
}
