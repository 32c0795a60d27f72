//! Screws, plates and their per-tick motion

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::ScrewStore;
use crate::consts::*;
use crate::lerp_factor;

pub type ScrewId = u32;
pub type PlateId = u32;

/// Screw palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrewColor {
    Red,
    Blue,
    Yellow,
    Green,
    Purple,
    Orange,
    Pink,
}

impl ScrewColor {
    /// Colors available from level 1
    pub const BASE: [ScrewColor; 3] = [ScrewColor::Red, ScrewColor::Blue, ScrewColor::Yellow];

    /// Full palette (level 5+)
    pub const ALL: [ScrewColor; 7] = [
        ScrewColor::Red,
        ScrewColor::Blue,
        ScrewColor::Yellow,
        ScrewColor::Green,
        ScrewColor::Purple,
        ScrewColor::Orange,
        ScrewColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScrewColor::Red => "red",
            ScrewColor::Blue => "blue",
            ScrewColor::Yellow => "yellow",
            ScrewColor::Green => "green",
            ScrewColor::Purple => "purple",
            ScrewColor::Orange => "orange",
            ScrewColor::Pink => "pink",
        }
    }

    /// Linear RGBA used by the renderer
    pub fn rgba(&self) -> [f32; 4] {
        let hex: u32 = match self {
            ScrewColor::Red => 0xff3b3b,
            ScrewColor::Blue => 0x3b9eff,
            ScrewColor::Yellow => 0xffd93b,
            ScrewColor::Green => 0x4caf50,
            ScrewColor::Purple => 0x9c27b0,
            ScrewColor::Orange => 0xff9800,
            ScrewColor::Pink => 0xe91e63,
        };
        [
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
            1.0,
        ]
    }
}

/// A screw, attached to its plate until tapped into the slot row
#[derive(Debug, Clone)]
pub struct Screw {
    pub id: ScrewId,
    /// Plate this screw was created on
    pub plate: PlateId,
    pub pos: Vec2,
    pub target: Vec2,
    pub color: ScrewColor,
    pub radius: f32,
    /// Move animation in progress
    pub moving: bool,
    /// Screw has left its plate for the slot row
    pub in_slot: bool,
    /// Phase offset for the renderer's glint
    pub glint_phase: f32,
}

impl Screw {
    pub fn new(id: ScrewId, plate: PlateId, pos: Vec2, color: ScrewColor, radius: f32) -> Self {
        Self {
            id,
            plate,
            pos,
            target: pos,
            color,
            radius,
            moving: false,
            in_slot: false,
            glint_phase: 0.0,
        }
    }

    /// Start a move animation toward `target`
    pub fn move_to(&mut self, target: Vec2) {
        self.target = target;
        self.moving = true;
    }

    /// Advance the move animation. Returns true on the tick it completes.
    pub fn update(&mut self, dt: f32, lerp_speed: f32) -> bool {
        if !self.moving {
            return false;
        }

        let delta = self.target - self.pos;
        if delta.x.abs() < SNAP_DISTANCE && delta.y.abs() < SNAP_DISTANCE {
            self.pos = self.target;
            self.moving = false;
            return true;
        }

        self.pos += delta * lerp_factor(lerp_speed, dt);
        false
    }
}

/// Spring vibration duration (seconds)
pub const VIBRATION_DURATION: f64 = 0.3;
/// Peak jitter (pixels)
pub const VIBRATION_INTENSITY: f32 = 3.0;
/// Jitter resample interval (seconds)
pub const VIBRATION_INTERVAL: f64 = 0.05;

/// Outcome of sampling a vibration on a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VibrationSample {
    /// Keep the current jittered baseline until the next resample
    Hold,
    Jitter(f32),
    Expired,
}

/// Short decaying jitter of a plate's baseline after a screw is pulled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringVibration {
    /// Baseline x to restore when the vibration ends
    pub origin_x: f32,
    pub started_at: f64,
    last_sample_at: Option<f64>,
}

impl SpringVibration {
    pub fn new(origin_x: f32, now: f64) -> Self {
        Self {
            origin_x,
            started_at: now,
            last_sample_at: None,
        }
    }

    pub fn sample(&mut self, now: f64, rng: &mut Pcg32) -> VibrationSample {
        let elapsed = now - self.started_at;
        if elapsed > VIBRATION_DURATION {
            return VibrationSample::Expired;
        }
        if let Some(last) = self.last_sample_at
            && now - last < VIBRATION_INTERVAL
        {
            return VibrationSample::Hold;
        }
        self.last_sample_at = Some(now);

        let intensity = VIBRATION_INTENSITY * (1.0 - (elapsed / VIBRATION_DURATION) as f32);
        VibrationSample::Jitter(self.origin_x + (rng.random::<f32>() - 0.5) * intensity)
    }
}

/// Inputs shared by every plate update in a tick
#[derive(Debug, Clone, Copy)]
pub struct PlateTick {
    pub dt: f32,
    pub now: f64,
    pub gravity: f32,
    pub sway_amount: f32,
    pub viewport_height: f32,
}

/// A metal plate holding a fixed set of screws
#[derive(Debug, Clone)]
pub struct Plate {
    pub id: PlateId,
    /// Top-left corner, including sway
    pub pos: Vec2,
    /// Baseline the sway oscillates around
    pub base: Vec2,
    pub size: Vec2,
    /// Diagonal tilt (radians, render-only)
    pub rotation: f32,
    pub color: ScrewColor,
    /// Screws this plate was created with (never changes)
    pub screws: Vec<ScrewId>,
    pub velocity_y: f32,
    pub falling: bool,
    pub offscreen: bool,
    pub sway_phase: f32,
    pub sway_speed: f32,
    pub vibration: Option<SpringVibration>,
}

impl Plate {
    pub fn new(id: PlateId, pos: Vec2, rotation: f32, color: ScrewColor) -> Self {
        Self {
            id,
            pos,
            base: pos,
            size: Vec2::new(PLATE_WIDTH, PLATE_HEIGHT),
            rotation,
            color,
            screws: Vec::new(),
            velocity_y: 0.0,
            falling: false,
            offscreen: false,
            sway_phase: 0.0,
            sway_speed: 1.0,
            vibration: None,
        }
    }

    /// Rest position of the `index`-th screw relative to the plate baseline
    pub fn screw_anchor(base: Vec2, index: usize) -> Vec2 {
        Vec2::new(
            base.x + SCREW_INSET_X + index as f32 * SCREW_SPACING,
            base.y + SCREW_INSET_Y,
        )
    }

    /// Advance sway or fall, carrying attached screws along
    pub fn update(&mut self, tick: &PlateTick, screws: &mut ScrewStore, rng: &mut Pcg32) {
        if !self.falling {
            self.update_vibration(tick.now, rng);

            self.sway_phase += 0.02 * self.sway_speed * tick.dt * REFERENCE_FPS;
            let sway = self.sway_phase.sin() * tick.sway_amount;
            self.pos.x = self.base.x + sway;

            for (index, id) in self.screws.iter().enumerate() {
                if let Some(screw) = screws.get_mut(*id)
                    && !screw.in_slot
                {
                    screw.pos.x = Self::screw_anchor(self.base, index).x + sway;
                    screw.target.x = screw.pos.x;
                }
            }
            return;
        }

        self.velocity_y += tick.gravity * tick.dt;
        let dy = self.velocity_y * tick.dt;
        self.pos.y += dy;

        for id in &self.screws {
            if let Some(screw) = screws.get_mut(*id)
                && !screw.in_slot
            {
                screw.pos.y += dy;
                screw.target.y = screw.pos.y;
            }
        }

        if self.pos.y > tick.viewport_height + self.size.y {
            self.offscreen = true;
        }
    }

    /// Kick off a spring vibration (no-op while falling)
    pub fn vibrate(&mut self, now: f64) {
        if self.falling {
            return;
        }
        // Restarting keeps the original rest position
        let origin_x = self.vibration.map_or(self.base.x, |v| v.origin_x);
        self.vibration = Some(SpringVibration::new(origin_x, now));
    }

    fn update_vibration(&mut self, now: f64, rng: &mut Pcg32) {
        let Some(vibration) = self.vibration.as_mut() else {
            return;
        };
        match vibration.sample(now, rng) {
            VibrationSample::Hold => {}
            VibrationSample::Jitter(x) => self.base.x = x,
            VibrationSample::Expired => {
                self.base.x = vibration.origin_x;
                self.vibration = None;
            }
        }
    }

    /// Start falling once every owned screw is slotted. Returns true on the
    /// transition, which happens at most once.
    pub fn check_empty(&mut self, screws: &ScrewStore) -> bool {
        if self.falling {
            return false;
        }
        // Screws already matched away are gone from the store; they were slotted
        let all_slotted = self
            .screws
            .iter()
            .all(|id| screws.get(*id).is_none_or(|s| s.in_slot));
        if all_slotted {
            self.start_falling();
        }
        all_slotted
    }

    fn start_falling(&mut self) {
        self.falling = true;
        self.velocity_y = 0.0;
        if let Some(vibration) = self.vibration.take() {
            self.base.x = vibration.origin_x;
        }
    }
}
