//! Scene tessellation: game state → triangle list

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors, with_alpha};
use super::vfx::Effects;
use crate::sim::{GamePhase, GameState, Plate, Screw};

const CIRCLE_SEGMENTS: u32 = 24;
const PARTICLE_SEGMENTS: u32 = 8;
const BOLT_RADIUS: f32 = 4.0;
const BOLT_INSET: f32 = 10.0;
/// Empty slot drawn slightly larger than a screw
const SLOT_MARGIN: f32 = 5.0;
/// Glint shows while its sine wave is above this level
const GLINT_THRESHOLD: f32 = 0.7;

/// Build the full frame, back to front
pub fn build_scene(state: &GameState, effects: &mut Effects) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(4096);
    if state.phase == GamePhase::NotStarted {
        return vertices;
    }

    let offset = effects.shake_offset();

    for slot in state.slots.slots() {
        if slot.screw.is_none() {
            empty_slot(&mut vertices, slot.pos + offset, state.config.screw_radius);
        }
    }
    for plate in &state.plates {
        plate_body(&mut vertices, plate, offset);
    }
    let time = effects.time();
    for screw in state.screws.iter() {
        screw_head(&mut vertices, screw, offset, time);
    }
    for particle in &effects.particles {
        vertices.extend(shapes::circle(
            particle.pos + offset,
            particle.size,
            with_alpha(particle.color, particle.life.clamp(0.0, 1.0)),
            PARTICLE_SEGMENTS,
        ));
    }

    vertices
}

fn empty_slot(vertices: &mut Vec<Vertex>, center: Vec2, screw_radius: f32) {
    let r = screw_radius + SLOT_MARGIN;
    vertices.extend(shapes::circle(center, r, colors::SLOT_EMPTY, CIRCLE_SEGMENTS));
    vertices.extend(shapes::ring(center, r - 4.0, r - 2.0, colors::SLOT_GROOVE, CIRCLE_SEGMENTS));
    cross(vertices, center, r / 2.0, 4.0, colors::SLOT_GROOVE);
}

fn plate_body(vertices: &mut Vec<Vertex>, plate: &Plate, offset: Vec2) {
    let top_left = plate.pos + offset;
    vertices.extend(shapes::rect(
        top_left - Vec2::splat(2.0),
        plate.size + Vec2::splat(4.0),
        plate.rotation,
        colors::PLATE_EDGE,
    ));
    vertices.extend(shapes::rect(top_left, plate.size, plate.rotation, colors::PLATE));

    // Corner bolts follow the tilt
    let center = top_left + plate.size / 2.0;
    let rot = Vec2::from_angle(plate.rotation);
    let half = plate.size / 2.0 - Vec2::splat(BOLT_INSET);
    for corner in [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(-half.x, half.y),
        Vec2::new(half.x, half.y),
    ] {
        vertices.extend(shapes::circle(
            center + rot.rotate(corner),
            BOLT_RADIUS,
            colors::PLATE_BOLT,
            CIRCLE_SEGMENTS / 2,
        ));
    }
}

fn screw_head(vertices: &mut Vec<Vertex>, screw: &Screw, offset: Vec2, time: f32) {
    let center = screw.pos + offset;
    let r = screw.radius;
    vertices.extend(shapes::circle(center, r, screw.color.rgba(), CIRCLE_SEGMENTS));
    vertices.extend(shapes::ring(center, r - 1.5, r + 1.5, colors::SCREW_RIM, CIRCLE_SEGMENTS));
    cross(vertices, center, r * 0.5, 2.0, colors::SCREW_CROSS);
    vertices.extend(shapes::circle(
        center - Vec2::splat(r * 0.3),
        r * 0.3,
        colors::HIGHLIGHT,
        CIRCLE_SEGMENTS / 2,
    ));

    let glint = ((time + screw.glint_phase).sin() + 1.0) * 0.5;
    if glint > GLINT_THRESHOLD {
        vertices.extend(shapes::circle(
            center - Vec2::splat(r * 0.4),
            r * 0.35,
            with_alpha(colors::HIGHLIGHT, (glint - GLINT_THRESHOLD) * 2.0),
            CIRCLE_SEGMENTS / 2,
        ));
    }
}

fn cross(vertices: &mut Vec<Vertex>, center: Vec2, half: f32, width: f32, color: [f32; 4]) {
    vertices.extend(shapes::line(
        center - Vec2::new(half, 0.0),
        center + Vec2::new(half, 0.0),
        width,
        color,
    ));
    vertices.extend(shapes::line(
        center - Vec2::new(0.0, half),
        center + Vec2::new(0.0, half),
        width,
        color,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::Viewport;

    #[test]
    fn test_start_screen_draws_nothing() {
        let state = GameState::new(GameConfig::default(), Viewport::new(400.0, 700.0), 1);
        let mut fx = Effects::new(1);
        assert!(build_scene(&state, &mut fx).is_empty());
    }

    #[test]
    fn test_scene_uses_screw_colors() {
        let mut state = GameState::new(GameConfig::default(), Viewport::new(400.0, 700.0), 1);
        state.start_game();
        let mut fx = Effects::new(1);
        let vertices = build_scene(&state, &mut fx);

        assert_eq!(vertices.len() % 3, 0);
        for screw in state.screws.iter() {
            let rgba = screw.color.rgba();
            assert!(vertices.iter().any(|v| v.color == rgba));
        }
    }
}
