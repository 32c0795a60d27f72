//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// View a vertex list as raw bytes for upload
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.149, 0.149, 0.149, 1.0];
    pub const PLATE: [f32; 4] = [0.227, 0.227, 0.227, 1.0];
    pub const PLATE_EDGE: [f32; 4] = [0.541, 0.541, 0.541, 1.0];
    pub const PLATE_BOLT: [f32; 4] = [0.667, 0.667, 0.667, 1.0];
    pub const SCREW_RIM: [f32; 4] = [0.541, 0.541, 0.541, 1.0];
    pub const SCREW_CROSS: [f32; 4] = [0.29, 0.29, 0.29, 1.0];
    pub const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.3];
    pub const SLOT_EMPTY: [f32; 4] = [0.4, 0.4, 0.4, 1.0];
    pub const SLOT_GROOVE: [f32; 4] = [0.267, 0.267, 0.267, 1.0];
}

/// Same color with a different alpha
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}
