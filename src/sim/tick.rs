//! Per-frame simulation tick
//!
//! Order inside a Playing tick: timer, tap input, screw animation and match
//! resolution, plate motion, removal of off-screen plates. A match is always
//! resolved before level completion is evaluated. A full row with no match
//! only ends the run through damage from rejected taps or the timer.

use glam::Vec2;

use super::entities::{PlateTick, ScrewId};
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (one-shot)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Leave the start screen
    pub start: bool,
    /// Pointer-down in logical coordinates
    pub tap: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Proceed from the level-complete screen
    pub next_level: bool,
    /// Back to the start screen
    pub restart: bool,
}

/// Advance the game by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart && state.phase != GamePhase::NotStarted {
        state.restart();
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.pause();
                return;
            }
            GamePhase::Paused => state.resume(),
            _ => {}
        }
    }

    match state.phase {
        GamePhase::NotStarted => {
            if input.start {
                state.begin_start();
            }
            advance_start_transition(state, dt);
            return;
        }
        GamePhase::LevelComplete => {
            if input.next_level {
                state.next_level();
            }
            return;
        }
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Playing => {}
    }

    state.clock += dt as f64;

    // Timer
    if state.time_remaining > 0.0 {
        state.time_remaining -= dt;
        if state.time_remaining <= 0.0 {
            state.time_remaining = 0.0;
            state.check_game_over();
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    if let Some(point) = input.tap {
        handle_tap(state, point);
        if state.phase != GamePhase::Playing {
            return;
        }
    }

    update_screws(state, dt);
    update_plates(state, dt);
}

fn advance_start_transition(state: &mut GameState, dt: f32) {
    let Some(elapsed) = state.start_transition.as_mut() else {
        return;
    };
    *elapsed += dt;
    if *elapsed >= state.config.start_transition_secs {
        state.start_game();
    }
}

/// Pull the first attached screw under `point` into the slot row.
/// Returns the screw hit, if any.
pub fn handle_tap(state: &mut GameState, point: Vec2) -> Option<ScrewId> {
    if state.phase != GamePhase::Playing {
        return None;
    }
    let id = state.screw_at(point)?;
    let plate_id = state.screws.get(id)?.plate;

    state.emit(GameEvent::Unscrewed {
        screw: id,
        plate: plate_id,
    });

    let now = state.clock;
    if let Some(plate) = state.plate_mut(plate_id) {
        plate.vibrate(now);
    }

    let placed = match state.screws.get_mut(id) {
        Some(screw) => state.slots.try_place(screw),
        None => None,
    };

    match placed {
        Some(slot) => {
            log::debug!("Screw {} -> slot {}", id, slot);
            state.emit(GameEvent::Slotted { screw: id, slot });

            let mut emptied = Vec::new();
            for plate in &mut state.plates {
                if plate.check_empty(&state.screws) {
                    emptied.push((plate.id, plate.pos));
                }
            }
            for (plate, pos) in emptied {
                log::debug!("Plate {} emptied", plate);
                state.emit(GameEvent::PlateEmptied { plate, pos });
            }
        }
        None => {
            log::debug!("Slot row full, screw {} rejected", id);
            state.emit(GameEvent::SlotsFull { screw: id });
            state.take_damage();
        }
    }

    Some(id)
}

/// Animate screws; each slot-entry that completes triggers match resolution
fn update_screws(state: &mut GameState, dt: f32) {
    let lerp_speed = state.config.lerp_speed;

    for id in state.screws.ids() {
        let Some(screw) = state.screws.get_mut(id) else {
            // Removed by an earlier match this tick
            continue;
        };
        let arrived = screw.update(dt, lerp_speed);

        if arrived && screw.in_slot && state.phase == GamePhase::Playing {
            resolve_match(state);
            state.check_level_complete();
        }
    }
}

/// Clear one match from the slot row if present. Returns true on a match.
pub fn resolve_match(state: &mut GameState) -> bool {
    let Some(color) = state.slots.check_match(&state.screws) else {
        return false;
    };

    let now = state.clock;
    state.register_match(now);

    let removed = state.slots.remove_matched(color, &mut state.screws);
    let positions: Vec<Vec2> = removed
        .iter()
        .filter_map(|id| state.screws.remove(*id))
        .map(|screw| screw.pos)
        .collect();

    log::debug!(
        "Matched {} x{} (combo {})",
        color.as_str(),
        positions.len(),
        state.combo
    );
    state.emit(GameEvent::Matched { color, positions });

    // Freed slots can only lift the row-full condition
    state.check_game_over();
    true
}

fn update_plates(state: &mut GameState, dt: f32) {
    let plate_tick = PlateTick {
        dt,
        now: state.clock,
        gravity: state.config.gravity,
        sway_amount: state.config.sway_amount,
        viewport_height: state.viewport.height,
    };

    for plate in &mut state.plates {
        plate.update(&plate_tick, &mut state.screws, &mut state.rng);
    }

    let mut removed = Vec::new();
    state.plates.retain(|plate| {
        if plate.offscreen {
            removed.push(plate.id);
        }
        !plate.offscreen
    });
    for plate in removed {
        state.emit(GameEvent::PlateRemoved { plate });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::{GameOverReason, Viewport};

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> GameState {
        let mut state = GameState::new(GameConfig::default(), Viewport::new(400.0, 700.0), 12345);
        state.start_game();
        state.drain_events();
        state
    }

    fn settle(state: &mut GameState) {
        for _ in 0..120 {
            tick(state, &TickInput::default(), DT);
        }
    }

    fn tap_screw(state: &mut GameState, id: ScrewId) {
        let pos = state.screws.get(id).unwrap().pos;
        let input = TickInput {
            tap: Some(pos),
            ..Default::default()
        };
        tick(state, &input, DT);
    }

    #[test]
    fn test_start_transition_then_playing() {
        let mut state = GameState::new(GameConfig::default(), Viewport::new(400.0, 700.0), 1);
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, DT);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert!(state.start_transition.is_some());

        for _ in 0..40 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.screws.len(), 6);
    }

    #[test]
    fn test_tap_slots_screw_and_clearing_plate_starts_fall() {
        let mut state = playing();
        let plate = state.plates[0].clone();

        for id in &plate.screws {
            tap_screw(&mut state, *id);
        }
        let events = state.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PlateEmptied { plate: p, .. } if *p == plate.id)));
        assert!(state.plate(plate.id).unwrap().falling);

        settle(&mut state);
        // Three of one color match away and the plate leaves play
        assert!(state.slots.is_empty());
        assert!(state.plate(plate.id).is_none());
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn test_clearing_every_plate_completes_level() {
        let mut state = playing();
        for id in state.screws.ids() {
            tap_screw(&mut state, id);
            settle(&mut state);
        }
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.level, 2);

        let next = TickInput {
            next_level: true,
            ..Default::default()
        };
        tick(&mut state, &next, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_timer_runs_out() {
        let mut state = playing();
        state.time_remaining = 0.01;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.time_remaining, 0.0);
    }

    #[test]
    fn test_pause_freezes_timer() {
        let mut state = playing();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let before = state.time_remaining;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.time_remaining, before);

        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.time_remaining < before);
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut state = playing();
        state.time_remaining = 0.0;
        state.check_game_over();
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, DT);
        assert_eq!(state.phase, GamePhase::NotStarted);
    }

    #[test]
    fn test_full_row_without_match_costs_health_per_tap() {
        let config = GameConfig {
            slot_capacity: 2,
            match_count: 2,
            ..GameConfig::default()
        };
        let mut state = GameState::new(config, Viewport::new(400.0, 700.0), 3);
        state.start_game();
        state.drain_events();

        // Level 1 has one red and one blue plate
        let red = state.plates[0].screws.clone();
        let blue = state.plates[1].screws.clone();
        tap_screw(&mut state, red[0]);
        tap_screw(&mut state, blue[0]);
        settle(&mut state);
        assert!(state.slots.is_full());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.health, 3);

        for (expected, id) in [(2, red[1]), (1, red[2]), (0, blue[1])] {
            assert_eq!(state.phase, GamePhase::Playing);
            tap_screw(&mut state, id);
            assert_eq!(state.health, expected);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.game_over_reason(), Some(GameOverReason::SlotsFull));
        assert!(state.time_remaining > 0.0);

        let damage: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::DamageTaken { .. }))
            .collect();
        assert_eq!(
            damage,
            vec![
                GameEvent::DamageTaken { health: 2 },
                GameEvent::DamageTaken { health: 1 },
                GameEvent::DamageTaken { health: 0 },
            ]
        );
    }

    #[test]
    fn test_match_waits_for_slot_entry_to_settle() {
        let mut state = playing();
        let plate = state.plates[0].clone();

        for id in &plate.screws {
            tap_screw(&mut state, *id);
        }
        // Still animating toward the row: nothing matched yet
        assert!(!state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Matched { .. })));
        assert_eq!(state.slots.occupied_count(), 3);
        assert!(plate.screws.iter().all(|id| state.screws.get(*id).is_some_and(|s| s.in_slot)));

        // Step until the last screw reports arrival
        let last = plate.screws[2];
        let mut frames = 0;
        while state.screws.get(last).is_some_and(|s| s.moving) {
            tick(&mut state, &TickInput::default(), DT);
            frames += 1;
            assert!(frames < 120, "slot entry never settled");
        }
        let events = state.drain_events();
        assert!(frames > 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Matched { .. })));
        assert!(state.slots.is_empty());
    }

    #[test]
    fn test_rejected_tap_at_last_health_ends_run() {
        let config = GameConfig {
            slot_capacity: 1,
            match_count: 1,
            max_health: 1,
            ..GameConfig::default()
        };
        let mut state = GameState::new(config, Viewport::new(400.0, 700.0), 3);
        state.start_game();
        state.drain_events();

        let first = state.plates[0].screws[0];
        let second = state.plates[0].screws[1];
        tap_screw(&mut state, first);
        // Row is full while the first screw is still in flight
        tap_screw(&mut state, second);

        assert_eq!(state.health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.time_remaining > 0.0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::SlotsFull { screw: second }));
        assert!(events.contains(&GameEvent::DamageTaken { health: 0 }));
    }

    #[test]
    fn test_tap_on_empty_space_does_nothing() {
        let mut state = playing();
        assert_eq!(handle_tap(&mut state, Vec2::new(-100.0, -100.0)), None);
        assert!(state.slots.is_empty());
        assert!(state.events.is_empty());
    }
}
