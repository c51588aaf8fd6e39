//! Time-driven spin animation
//!
//! Rotation is a pure function of elapsed time, so a frame never accumulates
//! drift and any elapsed time can be evaluated directly.

use cgmath::{Euler, Rad};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotation about one axis at a constant angular speed (rad/s)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub axis: Axis,
    pub speed: f32,
}

impl Spin {
    pub fn new(axis: Axis, speed: f32) -> Self {
        Self { axis, speed }
    }

    /// Angle in radians after `elapsed` seconds
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        self.speed * elapsed
    }

    /// Writes the spin angle into `rotation`, leaving the other axes alone
    pub fn apply(&self, rotation: &mut Euler<Rad<f32>>, elapsed: f32) {
        let angle = Rad(self.angle_at(elapsed));
        match self.axis {
            Axis::X => rotation.x = angle,
            Axis::Y => rotation.y = angle,
            Axis::Z => rotation.z = angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_grows_linearly() {
        let spin = Spin::new(Axis::Y, 0.3);
        assert_eq!(spin.angle_at(0.0), 0.0);
        assert!((spin.angle_at(10.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn apply_only_touches_its_axis() {
        let mut rotation = Euler::new(Rad(0.1), Rad(0.2), Rad(0.3));
        Spin::new(Axis::Z, 0.3).apply(&mut rotation, 2.0);
        assert_eq!(rotation.x, Rad(0.1));
        assert_eq!(rotation.y, Rad(0.2));
        assert!((rotation.z.0 - 0.6).abs() < 1e-6);
    }
}
