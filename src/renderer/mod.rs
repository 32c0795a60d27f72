//! Rendering collaborator
//!
//! Tessellates the game state into a colored triangle list each frame. It
//! only reads simulation state and events.

pub mod scene;
pub mod shapes;
pub mod vertex;
pub mod vfx;

pub use scene::build_scene;
pub use vertex::Vertex;
pub use vfx::Effects;
