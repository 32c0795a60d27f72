//! Game tunables
//!
//! Fixed at startup. Defaults match the shipped game; a JSON document may
//! override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Startup configuration for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Slot row ===
    /// Number of holding slots
    pub slot_capacity: usize,
    /// Screws of one color needed for a match
    pub match_count: usize,
    /// Occupied slots released by the extra-slots relief action
    pub extra_slot_release: usize,

    // === Entities ===
    /// Screw hit radius (logical pixels)
    pub screw_radius: f32,
    /// Fraction of remaining distance covered per 60 Hz frame
    pub lerp_speed: f32,
    /// Falling plate acceleration (pixels/s²)
    pub gravity: f32,
    /// Peak lateral sway of a resting plate (pixels)
    pub sway_amount: f32,

    // === Rules ===
    /// Countdown per level (seconds)
    pub level_duration_secs: f32,
    /// Maximum gap between matches that still counts as a combo (ms)
    pub combo_window_ms: f64,
    /// Damage the player can take before the run ends
    pub max_health: u8,
    /// Show an interstitial whenever the new level is a multiple of this
    pub interstitial_every: u32,

    // === Transitions ===
    /// Start screen fade-out before the first level loads (seconds)
    pub start_transition_secs: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Slot row
            slot_capacity: 5,
            match_count: 3,
            extra_slot_release: 2,

            // Entities
            screw_radius: crate::consts::SCREW_RADIUS,
            lerp_speed: 0.15,
            gravity: 0.5 * crate::consts::REFERENCE_FPS * crate::consts::REFERENCE_FPS,
            sway_amount: 5.0,

            // Rules
            level_duration_secs: 60.0,
            combo_window_ms: 5000.0,
            max_health: 3,
            interstitial_every: 2,

            // Transitions
            start_transition_secs: 0.6,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check that the tunables describe a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_capacity == 0 {
            return Err(ConfigError::Invalid("slot_capacity must be at least 1".into()));
        }
        if self.match_count == 0 || self.match_count > self.slot_capacity {
            return Err(ConfigError::Invalid(format!(
                "match_count must be in 1..={}, got {}",
                self.slot_capacity, self.match_count
            )));
        }
        if self.screw_radius <= 0.0 {
            return Err(ConfigError::Invalid("screw_radius must be positive".into()));
        }
        if !(self.lerp_speed > 0.0 && self.lerp_speed <= 1.0) {
            return Err(ConfigError::Invalid("lerp_speed must be in (0, 1]".into()));
        }
        if self.level_duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "level_duration_secs must be positive".into(),
            ));
        }
        if self.combo_window_ms < 0.0 {
            return Err(ConfigError::Invalid("combo_window_ms must not be negative".into()));
        }
        if self.max_health == 0 {
            return Err(ConfigError::Invalid("max_health must be at least 1".into()));
        }
        Ok(())
    }

    /// Combo window in seconds (session clock units)
    pub fn combo_window_secs(&self) -> f64 {
        self.combo_window_ms / 1000.0
    }

    /// Whether completing into `level` should trigger an interstitial
    pub fn interstitial_due(&self, level: u32) -> bool {
        self.interstitial_every > 0 && level.is_multiple_of(self.interstitial_every)
    }
}
