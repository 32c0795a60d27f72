//! Level layouts and the difficulty curve
//!
//! Pure: the same (level, palette, center) always yields the same layout,
//! so reloading a level is idempotent.

use glam::Vec2;

use super::entities::{Plate, ScrewColor};
use crate::consts::*;

/// Screws on every plate
pub const SCREWS_PER_PLATE: usize = 3;
/// Plate count cap
pub const MAX_PLATES: usize = 4;
/// First level using the full palette
pub const FULL_PALETTE_LEVEL: u32 = 5;
/// First level using the alternating diagonal pattern
pub const ALTERNATING_LEVEL: u32 = 3;

/// One plate of a generated level
#[derive(Debug, Clone, PartialEq)]
pub struct PlateLayout {
    /// Top-left corner
    pub pos: Vec2,
    pub rotation: f32,
    pub color: ScrewColor,
    /// Screw centers, in plate order
    pub screws: Vec<Vec2>,
}

/// A generated level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub level: u32,
    pub plates: Vec<PlateLayout>,
}

impl LevelLayout {
    pub fn screw_count(&self) -> usize {
        self.plates.iter().map(|p| p.screws.len()).sum()
    }
}

/// Plates on `level`: grows every 3 levels, capped
pub fn plate_count(level: u32) -> usize {
    (2 + (level / 3) as usize).min(MAX_PLATES)
}

/// Colors in play on `level`
pub fn palette(level: u32) -> &'static [ScrewColor] {
    if level >= FULL_PALETTE_LEVEL {
        &ScrewColor::ALL
    } else {
        &ScrewColor::BASE
    }
}

/// Position and tilt of plate `index`
///
/// Early levels stack plates at the center; later levels alternate
/// left/right (even index left with negative tilt, odd right with positive).
pub fn plate_pattern(index: usize, center_x: f32, level: u32) -> (Vec2, f32) {
    let y = PLATE_BASE_Y + index as f32 * PLATE_SPACING;
    let x = center_x - PLATE_WIDTH / 2.0;

    if level >= ALTERNATING_LEVEL {
        let (offset, tilt) = if index % 2 == 0 {
            (-PLATE_ALTERNATE_OFFSET, -PLATE_TILT)
        } else {
            (PLATE_ALTERNATE_OFFSET, PLATE_TILT)
        };
        (Vec2::new(x + offset, y), tilt)
    } else {
        (Vec2::new(x, y), 0.0)
    }
}

/// Build the layout for `level`, cycling plate colors through `palette`
pub fn generate_level(level: u32, palette: &[ScrewColor], center_x: f32) -> LevelLayout {
    let palette = if palette.is_empty() {
        &ScrewColor::BASE[..]
    } else {
        palette
    };

    let plates = (0..plate_count(level))
        .map(|i| {
            let (pos, rotation) = plate_pattern(i, center_x, level);
            PlateLayout {
                pos,
                rotation,
                color: palette[i % palette.len()],
                screws: (0..SCREWS_PER_PLATE)
                    .map(|j| Plate::screw_anchor(pos, j))
                    .collect(),
            }
        })
        .collect();

    LevelLayout { level, plates }
}
