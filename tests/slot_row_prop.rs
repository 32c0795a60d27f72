//! Property tests for the slot row.
//!
//! Invariants covered:
//! - `is_full` turns true exactly after `capacity` successful placements.
//! - A rejected placement leaves the row and the screw untouched.
//! - Occupied slots stay packed at the lowest indices after removals.
//! - `check_match` reports a color iff some color reaches the threshold.
use glam::Vec2;
use proptest::prelude::*;
use screw_jam::sim::{Screw, ScrewColor, ScrewStore, SlotRow};

const RADIUS: f32 = 20.0;

fn color() -> impl Strategy<Value = ScrewColor> {
    prop::sample::select(ScrewColor::ALL.to_vec())
}

/// Spawn one screw per color and place as many as fit
fn fill(capacity: usize, match_count: usize, colors: &[ScrewColor]) -> (SlotRow, ScrewStore) {
    let mut row = SlotRow::new(capacity, match_count, 400.0);
    let mut store = ScrewStore::new();
    for (i, color) in colors.iter().enumerate() {
        let id = i as u32 + 1;
        store.insert(Screw::new(id, 0, Vec2::new(200.0, 300.0), *color, RADIUS));
        if let Some(screw) = store.get_mut(id) {
            row.try_place(screw);
        }
    }
    (row, store)
}

fn color_counts(row: &SlotRow, store: &ScrewStore) -> Vec<(ScrewColor, usize)> {
    ScrewColor::ALL
        .iter()
        .map(|c| {
            let n = row
                .occupants()
                .filter(|id| store.get(*id).is_some_and(|s| s.color == *c))
                .count();
            (*c, n)
        })
        .collect()
}

fn assert_targets_match_slots(row: &SlotRow, store: &ScrewStore) {
    for slot in row.slots() {
        if let Some(id) = slot.screw {
            let screw = store.get(id).expect("occupant exists");
            assert_eq!(screw.target, slot.pos);
            assert!(screw.in_slot);
        }
    }
}

proptest! {
    #[test]
    fn full_exactly_after_capacity_placements(
        capacity in 1usize..8,
        colors in prop::collection::vec(color(), 0..12),
    ) {
        let mut row = SlotRow::new(capacity, 3.min(capacity), 400.0);
        let mut store = ScrewStore::new();
        let mut placed = 0usize;

        for (i, color) in colors.iter().enumerate() {
            let id = i as u32 + 1;
            store.insert(Screw::new(id, 0, Vec2::new(200.0, 300.0), *color, RADIUS));
            let before: Vec<_> = row.occupants().collect();
            let screw = store.get_mut(id).expect("just inserted");

            match row.try_place(screw) {
                Some(index) => {
                    prop_assert_eq!(index, placed);
                    placed += 1;
                }
                None => {
                    prop_assert_eq!(placed, capacity);
                    prop_assert!(!screw.in_slot);
                    prop_assert_eq!(row.occupants().collect::<Vec<_>>(), before);
                }
            }
            prop_assert_eq!(row.is_full(), placed == capacity);
        }
        prop_assert_eq!(placed, colors.len().min(capacity));
    }

    #[test]
    fn match_reported_iff_threshold_reached(
        colors in prop::collection::vec(color(), 0..6),
        match_count in 1usize..4,
    ) {
        let (row, store) = fill(5, match_count, &colors);
        let counts = color_counts(&row, &store);

        match row.check_match(&store) {
            Some(matched) => {
                let n = counts.iter().find(|(c, _)| *c == matched).map(|(_, n)| *n);
                prop_assert!(n.is_some_and(|n| n >= match_count));
            }
            None => prop_assert!(counts.iter().all(|(_, n)| *n < match_count)),
        }
    }

    #[test]
    fn removal_keeps_row_packed(colors in prop::collection::vec(color(), 0..6)) {
        let (mut row, mut store) = fill(5, 3, &colors);

        while let Some(color) = row.check_match(&store) {
            let occupied = row.occupied_count();
            let removed = row.remove_matched(color, &mut store);
            prop_assert_eq!(removed.len(), 3);
            prop_assert_eq!(row.occupied_count(), occupied - 3);
            for id in removed {
                store.remove(id);
            }
            prop_assert!(row.is_compact());
            assert_targets_match_slots(&row, &store);
        }
        prop_assert!(row.is_compact());
    }

    #[test]
    fn release_frees_highest_slots(
        colors in prop::collection::vec(color(), 0..6),
        count in 0usize..4,
    ) {
        let (mut row, mut store) = fill(5, 3, &colors);
        let before: Vec<_> = row.occupants().collect();

        let released = row.release_highest(count, &mut store);
        let expected: Vec<_> = before.iter().rev().take(count).copied().collect();
        prop_assert_eq!(released, expected);
        prop_assert_eq!(
            row.occupants().collect::<Vec<_>>(),
            before[..before.len() - count.min(before.len())].to_vec()
        );
        prop_assert!(row.is_compact());
    }
}

#[test]
fn second_match_in_same_row_is_found_after_first_removal() {
    use ScrewColor::*;
    let (mut row, mut store) = fill(6, 3, &[Red, Blue, Red, Blue, Red, Blue]);

    assert_eq!(row.check_match(&store), Some(Red));
    for id in row.remove_matched(Red, &mut store) {
        store.remove(id);
    }
    assert_eq!(row.check_match(&store), Some(Blue));
    assert_eq!(row.occupied_count(), 3);
    assert!(row.is_compact());
}
