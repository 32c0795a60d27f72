//! Deterministic game-state engine
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only (and only for cosmetic motion)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod collision;
pub mod entities;
pub mod level;
pub mod slots;
pub mod state;
pub mod tick;

pub use arena::ScrewStore;
pub use collision::{circle_contains, find_screw_at};
pub use entities::{Plate, PlateId, Screw, ScrewColor, ScrewId, SpringVibration};
pub use level::{LevelLayout, PlateLayout, generate_level, palette, plate_count};
pub use slots::{Slot, SlotRow};
pub use state::{GameEvent, GameOverReason, GamePhase, GameState, Viewport};
pub use tick::{TickInput, handle_tap, resolve_match, tick};
