//! # Graphics Module
//!
//! Everything between the scene description and the GPU:
//!
//! - **Camera** ([`camera`]): perspective camera with damped orbit controls
//! - **Geometry** ([`geometry`]): procedural sphere, plane and torus meshes
//! - **Scene** ([`scene`]): nodes, lights and spin animation
//! - **Resources** ([`resources`]): shared material, textures, global uniforms
//! - **Rendering** ([`rendering`]): render engine, pipelines and shaders
//!
//! ```no_run
//! use stagehand::gfx::geometry::GeometryDescriptor;
//!
//! let torus = GeometryDescriptor::Torus {
//!     radius: 0.5,
//!     tube: 0.2,
//!     radial_segments: 16,
//!     tubular_segments: 32,
//! };
//! assert_eq!(torus.build().vertex_count(), 17 * 33);
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{orbit_controls::OrbitControls, perspective_camera::PerspectiveCamera};
pub use rendering::render_engine::RenderEngine;
