//! Scene lights
//!
//! Only the two kinds the lit scene uses. Point lights have no distance
//! falloff, so intensity alone sets their contribution.

use cgmath::Point3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from every direction
    Ambient { color: [f32; 3], intensity: f32 },
    /// Omnidirectional light at a position
    Point {
        color: [f32; 3],
        intensity: f32,
        position: Point3<f32>,
    },
}

impl Light {
    pub fn ambient(color: [f32; 3], intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn point(color: [f32; 3], intensity: f32, position: Point3<f32>) -> Self {
        Light::Point {
            color,
            intensity,
            position,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. } | Light::Point { intensity, .. } => *intensity,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        match self {
            Light::Ambient { color, .. } | Light::Point { color, .. } => *color,
        }
    }

    pub fn position(&self) -> Option<Point3<f32>> {
        match self {
            Light::Point { position, .. } => Some(*position),
            Light::Ambient { .. } => None,
        }
    }
}
