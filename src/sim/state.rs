//! Game state and lifecycle transitions
//!
//! `GameState` is the single context object for a session. It owns every
//! entity, the slot row, the RNG and the outgoing event queue.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arena::ScrewStore;
use super::collision::find_screw_at;
use super::entities::{Plate, PlateId, Screw, ScrewColor, ScrewId};
use super::level::{generate_level, palette};
use super::slots::SlotRow;
use crate::config::GameConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Start screen (optionally fading out)
    NotStarted,
    /// Active gameplay
    Playing,
    /// Suspended by the player or host page
    Paused,
    /// Board cleared, waiting for "next level"
    LevelComplete,
    /// Run ended, waiting for restart or relief
    GameOver,
}

/// Which game-over condition fired first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameOverReason {
    SlotsFull,
    OutOfHealth,
    OutOfTime,
}

/// Discrete notifications for audio, VFX, ads and the HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    StartTransition,
    LevelStarted { level: u32 },
    /// A screw was pulled from its plate (fires even if the row is full)
    Unscrewed { screw: ScrewId, plate: PlateId },
    Slotted { screw: ScrewId, slot: usize },
    /// Placement rejected because every slot is taken
    SlotsFull { screw: ScrewId },
    DamageTaken { health: u8 },
    Matched { color: ScrewColor, positions: Vec<Vec2> },
    Combo { count: u32 },
    PlateEmptied { plate: PlateId, pos: Vec2 },
    PlateRemoved { plate: PlateId },
    LevelComplete { cleared: u32, next: u32 },
    ShowInterstitial { level: u32 },
    GameOver { level: u32, reason: GameOverReason },
    ExtraSlotsGranted { released: usize },
    Paused,
    Resumed,
    Restarted,
}

/// Logical (CSS pixel) size of the play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub viewport: Viewport,
    pub seed: u64,
    /// Cosmetic randomness (sway, vibration); never affects layout
    pub rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    /// Seconds left on the level timer
    pub time_remaining: f32,
    pub health: u8,
    pub combo: u32,
    /// Session clock (seconds of play, frozen while not Playing)
    pub clock: f64,
    /// Clock value of the previous match
    pub last_match_at: Option<f64>,
    /// Seconds into the start-screen fade, if one is running
    pub start_transition: Option<f32>,
    pub screws: ScrewStore,
    /// Plates still in play (sorted by id)
    pub plates: Vec<Plate>,
    pub slots: SlotRow,
    /// Events emitted since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(config: GameConfig, viewport: Viewport, seed: u64) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("{}; clamping the slot row to a playable shape", err);
        }
        let slots = SlotRow::new(config.slot_capacity, config.match_count, viewport.width);
        Self {
            time_remaining: config.level_duration_secs,
            health: config.max_health,
            config,
            viewport,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            phase: GamePhase::NotStarted,
            combo: 0,
            clock: 0.0,
            last_match_at: None,
            start_transition: None,
            screws: ScrewStore::new(),
            plates: Vec::new(),
            slots,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fade progress of the start screen (0..1)
    pub fn start_transition_progress(&self) -> Option<f32> {
        let duration = self.config.start_transition_secs;
        self.start_transition
            .map(|t| if duration > 0.0 { (t / duration).min(1.0) } else { 1.0 })
    }

    /// Begin the start-screen fade; the first level loads when it elapses
    pub fn begin_start(&mut self) {
        if self.phase != GamePhase::NotStarted || self.start_transition.is_some() {
            return;
        }
        self.start_transition = Some(0.0);
        self.emit(GameEvent::StartTransition);
    }

    /// Enter gameplay at the current level with fresh timer, health and combo
    pub fn start_game(&mut self) {
        self.start_transition = None;
        self.combo = 0;
        self.last_match_at = None;
        log::info!("Game started at level {}", self.level);
        self.load_level(self.level);
    }

    /// Replace the board with `level`'s layout
    pub fn load_level(&mut self, level: u32) {
        self.screws.clear();
        self.plates.clear();
        self.slots.clear();
        self.level = level;
        self.phase = GamePhase::Playing;
        self.time_remaining = self.config.level_duration_secs;
        self.health = self.config.max_health;

        let layout = generate_level(level, palette(level), self.viewport.center_x());
        for plate_layout in layout.plates {
            let plate_id = self.next_entity_id();
            let mut plate = Plate::new(
                plate_id,
                plate_layout.pos,
                plate_layout.rotation,
                plate_layout.color,
            );
            plate.sway_phase = self.rng.random::<f32>() * std::f32::consts::TAU;
            plate.sway_speed = 0.5 + self.rng.random::<f32>() * 0.5;

            for pos in plate_layout.screws {
                let id = self.next_entity_id();
                let mut screw = Screw::new(
                    id,
                    plate_id,
                    pos,
                    plate_layout.color,
                    self.config.screw_radius,
                );
                screw.glint_phase = self.rng.random::<f32>() * std::f32::consts::TAU;
                self.screws.insert(screw);
                plate.screws.push(id);
            }
            self.plates.push(plate);
        }

        log::info!(
            "Loaded level {} ({} plates, {} screws)",
            level,
            self.plates.len(),
            self.screws.len()
        );
        self.emit(GameEvent::LevelStarted { level });
    }

    /// Continue after a level-complete screen
    pub fn next_level(&mut self) {
        if self.phase != GamePhase::LevelComplete {
            return;
        }
        self.load_level(self.level);
    }

    /// Back to the start screen at level 1 with an empty board
    pub fn restart(&mut self) {
        self.level = 1;
        self.phase = GamePhase::NotStarted;
        self.start_transition = None;
        self.screws.clear();
        self.plates.clear();
        self.slots.clear();
        self.combo = 0;
        self.last_match_at = None;
        self.time_remaining = self.config.level_duration_secs;
        self.health = self.config.max_health;
        log::info!("Game restarted");
        self.emit(GameEvent::Restarted);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            log::info!("Game paused");
            self.emit(GameEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            log::info!("Game resumed");
            self.emit(GameEvent::Resumed);
        }
    }

    /// Relayout for a new logical viewport
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.slots.layout(viewport.width, &mut self.screws);
    }

    /// First game-over condition that currently holds
    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        if self.slots.is_full() {
            Some(GameOverReason::SlotsFull)
        } else if self.health == 0 {
            Some(GameOverReason::OutOfHealth)
        } else if self.time_remaining <= 0.0 {
            Some(GameOverReason::OutOfTime)
        } else {
            None
        }
    }

    /// End the run if any game-over condition holds
    pub fn check_game_over(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return self.phase == GamePhase::GameOver;
        }
        let Some(reason) = self.game_over_reason() else {
            return false;
        };
        self.phase = GamePhase::GameOver;
        log::info!("Game over at level {} ({:?})", self.level, reason);
        self.emit(GameEvent::GameOver {
            level: self.level,
            reason,
        });
        true
    }

    /// Complete the level once no screw is left on any plate
    pub fn check_level_complete(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.screws.unslotted_count() > 0 {
            return false;
        }

        let cleared = self.level;
        self.level += 1;
        self.phase = GamePhase::LevelComplete;
        log::info!("Level {} complete", cleared);
        self.emit(GameEvent::LevelComplete {
            cleared,
            next: self.level,
        });

        if self.config.interstitial_due(self.level) {
            self.emit(GameEvent::ShowInterstitial { level: self.level });
        }
        true
    }

    /// Lose one health; running out ends the run
    pub fn take_damage(&mut self) {
        if self.health == 0 {
            return;
        }
        self.health -= 1;
        log::debug!("Damage taken, health now {}", self.health);
        self.emit(GameEvent::DamageTaken {
            health: self.health,
        });
        if self.health == 0 {
            self.check_game_over();
        }
    }

    /// Update the combo counter for a match at `now`
    pub fn register_match(&mut self, now: f64) {
        let within_window = self
            .last_match_at
            .is_some_and(|last| now - last <= self.config.combo_window_secs());

        if within_window {
            self.combo += 1;
            if self.combo >= 2 {
                self.emit(GameEvent::Combo { count: self.combo });
            }
        } else {
            self.combo = 1;
        }
        self.last_match_at = Some(now);
    }

    /// Whether the extra-slots relief can still change the outcome. A run
    /// whose timer has expired would end again on the next check.
    pub fn extra_slots_available(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::GameOver) && self.time_remaining > 0.0
    }

    /// Relief action: discard the highest-indexed slotted screws and lift
    /// a pending game over. A run that lost its last heart gets one back.
    pub fn grant_extra_slots(&mut self) -> usize {
        if !self.extra_slots_available() {
            log::debug!("Extra slots refused in {:?}", self.phase);
            return 0;
        }

        let released = self
            .slots
            .release_highest(self.config.extra_slot_release, &mut self.screws);
        for id in &released {
            self.screws.remove(*id);
        }

        if self.phase == GamePhase::GameOver {
            self.phase = GamePhase::Playing;
            self.health = self.health.max(1);
        }
        log::info!("Extra slots granted ({} screws discarded)", released.len());
        self.emit(GameEvent::ExtraSlotsGranted {
            released: released.len(),
        });

        self.check_level_complete();
        released.len()
    }

    /// Screw under the pointer, for hover feedback
    pub fn screw_at(&self, point: Vec2) -> Option<ScrewId> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        find_screw_at(&self.screws, point)
    }

    pub fn plate(&self, id: PlateId) -> Option<&Plate> {
        self.plates.iter().find(|p| p.id == id)
    }

    pub fn plate_mut(&mut self, id: PlateId) -> Option<&mut Plate> {
        self.plates.iter_mut().find(|p| p.id == id)
    }
}
