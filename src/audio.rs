//! Audio collaborator
//!
//! Procedurally generated sound effects via the Web Audio API - no external
//! files needed. Native builds use a silent sink.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Screw pulled from a plate
    Unscrew,
    /// Three of a kind cleared
    Match,
    /// Emptied plate drops away
    PlateFall,
}

impl SoundEffect {
    /// Sound triggered by a game event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Unscrewed { .. } => Some(SoundEffect::Unscrew),
            GameEvent::Matched { .. } => Some(SoundEffect::Match),
            GameEvent::PlateEmptied { .. } => Some(SoundEffect::PlateFall),
            _ => None,
        }
    }
}

/// Anything that can play game sounds
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    fn set_muted(&mut self, muted: bool);
}

/// Sink that drops every sound
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _effect: SoundEffect) {}
    fn set_muted(&mut self, _muted: bool) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 1.0,
                muted: false,
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Unscrew - short metallic click
        fn play_unscrew(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(800.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(400.0, t + 0.05)
                .ok();
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Match - bubbly pop with descending pitch
        fn play_match(&self, ctx: &AudioContext, vol: f32) {
            for (start, end) in [(600.0, 200.0), (900.0, 300.0)] {
                let Some((osc, gain)) = self.create_osc(ctx, start, OscillatorType::Sine) else {
                    continue;
                };
                let t = ctx.current_time();

                osc.frequency().set_value_at_time(start, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + 0.2)
                    .ok();
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();

                osc.start().ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }

        /// Plate fall - deep metallic thud with a short rattle
        fn play_plate_fall(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Triangle) {
                osc.frequency().set_value_at_time(150.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(80.0, t + 0.3)
                    .ok();
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.4).ok();
            }

            // Impact rattle
            if let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Square) {
                osc.frequency().set_value_at_time(1200.0, t).ok();
                osc.frequency().set_value_at_time(300.0, t + 0.02).ok();
                osc.frequency().set_value_at_time(900.0, t + 0.04).ok();
                osc.frequency().set_value_at_time(200.0, t + 0.06).ok();
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.1).ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Unscrew => self.play_unscrew(ctx, vol),
                SoundEffect::Match => self.play_match(ctx, vol),
                SoundEffect::PlateFall => self.play_plate_fall(ctx, vol),
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ScrewColor;
    use glam::Vec2;

    #[test]
    fn test_event_sounds() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Unscrewed { screw: 1, plate: 1 }),
            Some(SoundEffect::Unscrew)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Matched {
                color: ScrewColor::Red,
                positions: vec![Vec2::ZERO]
            }),
            Some(SoundEffect::Match)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PlateEmptied {
                plate: 1,
                pos: Vec2::ZERO
            }),
            Some(SoundEffect::PlateFall)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Paused), None);
    }
}
