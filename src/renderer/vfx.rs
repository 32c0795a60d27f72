//! Cosmetic effects driven by game events
//!
//! None of this feeds back into the simulation.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::REFERENCE_FPS;
use crate::sim::GameEvent;

/// Particles spawned per matched screw
pub const PARTICLES_PER_SCREW: usize = 15;
/// Maximum particles
pub const MAX_PARTICLES: usize = 512;
/// Screen shake duration (seconds)
pub const SHAKE_DURATION: f32 = 0.3;
/// Screen shake peak offset (pixels)
pub const SHAKE_INTENSITY: f32 = 6.0;
/// How long the combo banner stays up (seconds)
pub const COMBO_BANNER_DURATION: f32 = 1.5;

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per 60 Hz frame
    pub vel: Vec2,
    pub color: [f32; 4],
    /// 1 → 0
    pub life: f32,
    pub size: f32,
}

impl Particle {
    /// Advance; returns false once dead
    fn update(&mut self, dt: f32) -> bool {
        let frames = dt * REFERENCE_FPS;
        self.pos += self.vel * frames;
        self.vel.y += 0.3 * frames;
        self.life -= 0.02 * frames;
        self.life > 0.0
    }
}

/// Particles, screen shake and the combo banner
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    shake_remaining: f32,
    combo_remaining: f32,
    pub combo_count: u32,
    /// Seconds since creation, drives periodic shine
    time: f32,
    rng: Pcg32,
}

impl Effects {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            shake_remaining: 0.0,
            combo_remaining: 0.0,
            combo_count: 0,
            time: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// React to the events of one frame
    pub fn consume(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Matched { color, positions } => {
                    for pos in positions {
                        self.burst(*pos, color.rgba());
                    }
                }
                GameEvent::PlateEmptied { .. } => self.shake_remaining = SHAKE_DURATION,
                GameEvent::Combo { count } => {
                    self.combo_count = *count;
                    self.combo_remaining = COMBO_BANNER_DURATION;
                }
                GameEvent::LevelStarted { .. } | GameEvent::Restarted => self.clear(),
                _ => {}
            }
        }
    }

    fn burst(&mut self, origin: Vec2, color: [f32; 4]) {
        for _ in 0..PARTICLES_PER_SCREW {
            if self.particles.len() >= MAX_PARTICLES {
                return;
            }
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 8.0,
                (self.rng.random::<f32>() - 0.5) * 8.0 - 2.0,
            );
            self.particles.push(Particle {
                pos: origin,
                vel,
                color,
                life: 1.0,
                size: self.rng.random::<f32>() * 4.0 + 2.0,
            });
        }
    }

    /// Advance all effects (runs even while the game is paused)
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.particles.retain_mut(|p| p.update(dt));
        self.shake_remaining = (self.shake_remaining - dt).max(0.0);
        self.combo_remaining = (self.combo_remaining - dt).max(0.0);
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current camera offset from screen shake
    pub fn shake_offset(&mut self) -> Vec2 {
        if self.shake_remaining <= 0.0 {
            return Vec2::ZERO;
        }
        let strength = SHAKE_INTENSITY * self.shake_remaining / SHAKE_DURATION;
        Vec2::new(
            (self.rng.random::<f32>() - 0.5) * strength,
            (self.rng.random::<f32>() - 0.5) * strength,
        )
    }

    /// Combo count to display, while the banner is up
    pub fn combo_banner(&self) -> Option<u32> {
        (self.combo_remaining > 0.0).then_some(self.combo_count)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.shake_remaining = 0.0;
        self.combo_remaining = 0.0;
    }
}
