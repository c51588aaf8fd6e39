//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes the demo scene is built from, so no model
//! files are needed.
//!
//! ## Supported Primitives
//!
//! - **Sphere**: UV sphere with configurable radius and resolution
//! - **Plane**: Flat rectangle in the XY plane facing +Z
//! - **Torus**: Ring with configurable ring and tube radii
//!
//! All shapes use a right-handed, Y-up frame with counter-clockwise front faces.
//!
//! ## Usage
//!
//! ```rust
//! use stagehand::gfx::geometry::{generate_plane, generate_sphere, generate_torus};
//!
//! let sphere = generate_sphere(0.5, 16, 16);
//! let plane = generate_plane(1.0, 2.0, 3, 3);
//! let torus = generate_torus(0.5, 0.2, 16, 32);
//! assert_eq!(plane.vertex_count(), 16);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Describes which primitive a node was generated from, with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryDescriptor {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl GeometryDescriptor {
    /// Generates the vertex data for this descriptor
    pub fn build(&self) -> GeometryData {
        match *self {
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => generate_sphere(radius, width_segments, height_segments),
            Self::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => generate_plane(width, height, width_segments, height_segments),
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => generate_torus(radius, tube, radial_segments, tubular_segments),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Plane { .. } => "plane",
            Self::Torus { .. } => "torus",
        }
    }
}

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions, normals and UVs into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}
