//! # Scene Management Module
//!
//! The scene graph: renderable nodes sharing one material, lights, the vertex
//! format and the time-driven spin that animates each node.
//!
//! ```no_run
//! use stagehand::gfx::scene::animation::{Axis, Spin};
//!
//! let spin = Spin::new(Axis::Y, 0.3);
//! assert_eq!(spin.angle_at(0.0), 0.0);
//! ```

pub mod animation;
pub mod light;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use animation::{Axis, Spin};
pub use light::Light;
pub use object::{DrawNode, Mesh, Node, Transform};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
