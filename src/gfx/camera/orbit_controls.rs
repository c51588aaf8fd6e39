use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::perspective_camera::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// Spherical coordinates of the camera offset around the target (Y-up)
///
/// `theta` is the azimuth around Y measured from +Z, `phi` the polar angle
/// measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps phi away from the poles so `look_at` stays well defined
    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

/// Orbit-style camera controls with optional inertial damping
///
/// Input only accumulates deltas; nothing moves until [`OrbitControls::update`]
/// runs, once per frame. With damping enabled each update applies
/// `damping_factor` of the pending delta and decays the remainder by
/// `1 - damping_factor`, so motion eases out instead of stopping dead.
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enabled: bool,

    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,

    drag_mode: DragMode,
    is_shift_held: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enabled: true,
            spherical_delta: Spherical {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            },
            pan_offset: Vector3::zero(),
            scale: 1.0,
            drag_mode: DragMode::None,
            is_shift_held: false,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_damping(mut self, enabled: bool, factor: f32) -> Self {
        self.enable_damping = enabled;
        self.damping_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Moves the camera towards the target by `dolly_scale` (< 1 zooms in)
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Converts a pointer drag in pixels into orbit rotation
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = 2.0 * PI * self.rotate_speed / viewport_height;
        self.rotate_left(dx * scale);
        self.rotate_up(dy * scale);
    }

    /// Converts a pointer drag in pixels into a screen-space pan of the target
    pub fn pan_by_pixels(
        &mut self,
        dx: f32,
        dy: f32,
        viewport_height: f32,
        camera: &PerspectiveCamera,
    ) {
        if viewport_height <= 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        // half the visible height at the target's depth
        let target_distance = offset.magnitude() * (camera.fovy.0 / 2.0).tan();
        let (right, up) = camera.basis();

        let left_amount = 2.0 * dx * target_distance / viewport_height * self.pan_speed;
        let up_amount = 2.0 * dy * target_distance / viewport_height * self.pan_speed;

        self.pan_offset += right * -left_amount;
        self.pan_offset += up * up_amount;
    }

    /// Wheel notches; positive scrolls away from the user (zoom in)
    pub fn scroll(&mut self, notches: f32) {
        if notches > 0.0 {
            self.dolly_in(self.zoom_scale().powf(notches));
        } else if notches < 0.0 {
            self.dolly_out(self.zoom_scale().powf(-notches));
        }
    }

    pub fn process_window_event(
        &mut self,
        event: &WindowEvent,
        _viewport_height: f64,
        _camera: &PerspectiveCamera,
    ) {
        if !self.enabled {
            return;
        }
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.is_shift_held = modifiers.state().shift_key();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                self.drag_mode = match (pressed, button) {
                    (true, MouseButton::Left) if self.is_shift_held => DragMode::Pan,
                    (true, MouseButton::Left) => DragMode::Rotate,
                    (true, MouseButton::Right) => DragMode::Pan,
                    (true, _) => self.drag_mode,
                    (false, _) => DragMode::None,
                };
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // roughly one notch per 100 pixels on touchpads
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 100.0,
                };
                self.scroll(notches);
            }
            _ => (),
        }
    }

    pub fn process_device_event(
        &mut self,
        event: &DeviceEvent,
        viewport_height: f64,
        camera: &PerspectiveCamera,
    ) {
        if !self.enabled {
            return;
        }
        if let DeviceEvent::MouseMotion { delta } = event {
            let (dx, dy) = (delta.0 as f32, delta.1 as f32);
            match self.drag_mode {
                DragMode::Rotate => self.rotate_by_pixels(dx, dy, viewport_height as f32),
                DragMode::Pan => self.pan_by_pixels(dx, dy, viewport_height as f32, camera),
                DragMode::None => (),
            }
        }
    }

    /// Drops any in-progress drag, e.g. when the debug panel grabs the mouse
    pub fn cancel_drag(&mut self) {
        self.drag_mode = DragMode::None;
    }

    /// Whether a damped delta is still being played out
    pub fn has_pending_motion(&self) -> bool {
        self.spherical_delta.theta.abs() > EPS
            || self.spherical_delta.phi.abs() > EPS
            || self.pan_offset.magnitude2() > EPS * EPS
            || (self.scale - 1.0).abs() > EPS
    }

    /// Applies one step of accumulated input to the camera
    ///
    /// Returns `true` if the camera position or target changed.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let previous_position = camera.position;
        let previous_target = self.target;

        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - previous_position).magnitude2() > EPS * EPS
            || (self.target - previous_target).magnitude2() > EPS * EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(Deg(75.0), 4.0 / 3.0, 0.1, 100.0);
        camera.position = Point3::new(1.0, 1.0, 2.0);
        camera
    }

    fn azimuth(camera: &PerspectiveCamera, target: Point3<f32>) -> f32 {
        Spherical::from_offset(camera.position - target).theta
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vector3::new(1.0, 1.0, 2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-5);
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let mut camera = camera();
        let mut controls = OrbitControls::default().with_damping(true, 0.05);
        let before = camera.position;

        controls.update(&mut camera);

        assert!((camera.position - before).magnitude() < 1e-5);
        assert_eq!(camera.target, Point3::origin());
        assert!(!controls.has_pending_motion());
    }

    #[test]
    fn undamped_rotation_applies_in_one_step() {
        let mut camera = camera();
        let mut controls = OrbitControls::default();
        let start = azimuth(&camera, controls.target);

        controls.rotate_left(0.5);
        assert!(controls.update(&mut camera));

        let end = azimuth(&camera, controls.target);
        assert!((end - (start - 0.5)).abs() < 1e-5);
        assert!(!controls.has_pending_motion());
    }

    #[test]
    fn damped_rotation_eases_towards_full_delta() {
        let mut camera = camera();
        let mut controls = OrbitControls::default().with_damping(true, 0.05);
        let start = azimuth(&camera, controls.target);

        controls.rotate_left(0.5);
        controls.update(&mut camera);
        let first_step = start - azimuth(&camera, controls.target);
        assert!((first_step - 0.025).abs() < 1e-5);

        for _ in 0..400 {
            controls.update(&mut camera);
        }

        let total = start - azimuth(&camera, controls.target);
        assert!((total - 0.5).abs() < 1e-3);
        assert!(!controls.has_pending_motion());
    }

    #[test]
    fn polar_angle_stays_off_the_poles() {
        let mut camera = camera();
        let mut controls = OrbitControls::default();

        controls.rotate_up(10.0);
        controls.update(&mut camera);

        let offset = camera.position - controls.target;
        assert!(offset.x.is_finite() && offset.y.is_finite() && offset.z.is_finite());
        assert!(offset.x != 0.0 || offset.z != 0.0);
    }

    #[test]
    fn polar_angle_respects_configured_limit() {
        let mut camera = camera();
        let mut controls = OrbitControls::default();
        controls.max_polar_angle = PI / 2.0;

        controls.rotate_up(-10.0);
        controls.update(&mut camera);

        assert!(camera.position.y.abs() < 1e-4);
    }

    #[test]
    fn scroll_dollies_and_respects_limits() {
        let mut camera = camera();
        let mut controls = OrbitControls::default();
        controls.min_distance = 1.0;
        controls.max_distance = 3.0;
        let start = (camera.position - controls.target).magnitude();

        controls.scroll(1.0);
        controls.update(&mut camera);
        let closer = (camera.position - controls.target).magnitude();
        assert!((closer - start * 0.95).abs() < 1e-4);

        controls.scroll(-100.0);
        controls.update(&mut camera);
        let far = (camera.position - controls.target).magnitude();
        assert!((far - 3.0).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut camera = camera();
        let mut controls = OrbitControls::default();
        let offset_before = camera.position - controls.target;

        controls.pan_by_pixels(100.0, 0.0, 600.0, &camera);
        controls.update(&mut camera);

        assert!(controls.target != Point3::origin());
        let offset_after = camera.position - controls.target;
        assert!((offset_after - offset_before).magnitude() < 1e-4);
        assert_eq!(camera.target, controls.target);
    }

    #[test]
    fn drag_without_button_does_nothing() {
        let mut camera = camera();
        let mut controls = OrbitControls::default();
        let before = camera.position;

        controls.process_device_event(
            &DeviceEvent::MouseMotion { delta: (50.0, 20.0) },
            600.0,
            &camera,
        );
        controls.update(&mut camera);

        assert!((camera.position - before).magnitude() < 1e-5);
    }
}
