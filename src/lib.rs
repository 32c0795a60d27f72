//! Screw Jam - A screw-sorting match-3 puzzle
//!
//! Core modules:
//! - `sim`: Game-state engine (slot row, plates, level generation, tick)
//! - `session`: Context object tying the engine to audio/ad collaborators
//! - `renderer`: CPU draw list and cosmetic effects
//! - `config`: Startup tunables

pub mod ads;
pub mod audio;
pub mod config;
pub mod renderer;
pub mod session;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use session::Session;

use glam::Vec2;

/// Layout geometry (logical pixels, not DPI-scaled)
pub mod consts {
    /// Reference frame rate the per-frame tunables were authored against
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Screw hit/draw radius
    pub const SCREW_RADIUS: f32 = 20.0;
    /// Horizontal distance between screws on a plate
    pub const SCREW_SPACING: f32 = 60.0;
    /// Offset of the first screw from the plate's left edge
    pub const SCREW_INSET_X: f32 = 40.0;
    /// Offset of the screw row from the plate's top edge
    pub const SCREW_INSET_Y: f32 = 25.0;

    /// Plate size
    pub const PLATE_WIDTH: f32 = 200.0;
    pub const PLATE_HEIGHT: f32 = 80.0;
    /// First plate's top edge
    pub const PLATE_BASE_Y: f32 = 120.0;
    /// Vertical distance between stacked plates
    pub const PLATE_SPACING: f32 = 120.0;
    /// Horizontal shift for alternating layouts (level 3+)
    pub const PLATE_ALTERNATE_OFFSET: f32 = 60.0;
    /// Tilt for alternating layouts (radians)
    pub const PLATE_TILT: f32 = 0.1;

    /// Slot row geometry
    pub const SLOT_SPACING: f32 = 60.0;
    pub const SLOT_Y: f32 = 40.0;

    /// Distance under which a moving screw snaps to its target
    pub const SNAP_DISTANCE: f32 = 0.5;
}

/// Frame-rate independent lerp factor for a per-frame `speed` authored at 60 Hz
#[inline]
pub fn lerp_factor(speed: f32, dt: f32) -> f32 {
    let frames = dt * consts::REFERENCE_FPS;
    1.0 - (1.0 - speed.clamp(0.0, 1.0)).powf(frames)
}

/// Convert a CSS pixel position on a canvas to logical game coordinates
///
/// `client` is relative to the canvas' bounding rect, `css_size` is the
/// bounding rect size and `buffer_size` the backing store size in device pixels.
#[inline]
pub fn client_to_logical(client: Vec2, css_size: Vec2, buffer_size: Vec2, dpr: f32) -> Vec2 {
    if css_size.x <= 0.0 || css_size.y <= 0.0 || dpr <= 0.0 {
        return client;
    }
    client * (buffer_size / css_size) / dpr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_factor_matches_reference_frame() {
        let f = lerp_factor(0.15, 1.0 / 60.0);
        assert!((f - 0.15).abs() < 1e-5);
        // Two frames worth of time compounds
        let f2 = lerp_factor(0.15, 2.0 / 60.0);
        assert!((f2 - (1.0 - 0.85 * 0.85)).abs() < 1e-5);
    }

    #[test]
    fn test_client_to_logical_divides_out_dpr() {
        let p = client_to_logical(
            Vec2::new(100.0, 50.0),
            Vec2::new(400.0, 300.0),
            Vec2::new(800.0, 600.0),
            2.0,
        );
        assert!((p.x - 100.0).abs() < 1e-4);
        assert!((p.y - 50.0).abs() < 1e-4);
    }
}
