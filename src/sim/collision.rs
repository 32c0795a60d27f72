//! Pointer hit testing

use glam::Vec2;

use super::arena::ScrewStore;
use super::entities::{Screw, ScrewId};

/// Inclusive point-in-circle test
#[inline]
pub fn circle_contains(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) <= radius * radius
}

impl Screw {
    /// Point lies on the screw head
    pub fn contains(&self, point: Vec2) -> bool {
        circle_contains(self.pos, self.radius, point)
    }
}

/// First screw still on a plate whose head contains `point`
pub fn find_screw_at(screws: &ScrewStore, point: Vec2) -> Option<ScrewId> {
    screws
        .iter()
        .find(|s| !s.in_slot && s.contains(point))
        .map(|s| s.id)
}
