use super::camera_utils::CameraUniform;
use crate::config::CameraConfig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Y-up perspective camera looking at `target`
///
/// The projection matrix is cached; anything that changes `aspect`, `fovy`,
/// `znear` or `zfar` must go through a setter or call
/// [`PerspectiveCamera::update_projection_matrix`].
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
    projection: Matrix4<f32>,
    pub uniform: CameraUniform,
}

impl PerspectiveCamera {
    pub fn new(fovy: impl Into<Rad<f32>>, aspect: f32, znear: f32, zfar: f32) -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, 1.0),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            fovy: fovy.into(),
            aspect,
            znear,
            zfar,
            projection: Matrix4::identity(),
            uniform: CameraUniform::default(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(Deg(config.fov_y_degrees), aspect, config.near, config.far);
        camera.position = Point3::from_vec(config.position);
        camera
    }

    /// Recomputes the cached projection from fov/aspect/near/far
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn resize_projection(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.set_aspect((width / height) as f32);
        }
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    /// Unit vector from the eye towards the target
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    /// Camera-space right and up axes in world coordinates
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }

    pub fn update_view_proj(&mut self) {
        let view = self.view_matrix();
        self.uniform.view_position = [self.position.x, self.position.y, self.position.z, 1.0];
        self.uniform.view_proj = (self.projection * view).into();
        self.uniform.view = view.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_viewport() {
        let mut camera = PerspectiveCamera::from_config(&CameraConfig::default(), 800.0 / 600.0);
        assert!((camera.aspect - 1.3333).abs() < 1e-4);

        camera.resize_projection(1024.0, 768.0);
        assert!((camera.aspect - 1.3333).abs() < 1e-4);

        camera.resize_projection(1920.0, 1080.0);
        assert_eq!(camera.aspect, (1920.0_f64 / 1080.0) as f32);
    }

    #[test]
    fn projection_is_refreshed_on_aspect_change() {
        let mut camera = PerspectiveCamera::new(Deg(75.0), 1.0, 0.1, 100.0);
        let square = camera.projection_matrix();
        camera.set_aspect(2.0);
        let wide = camera.projection_matrix();
        // x scale is focal / aspect
        assert!((wide.x.x - square.x.x / 2.0).abs() < 1e-6);
        assert_eq!(wide.y.y, square.y.y);
    }

    #[test]
    fn degenerate_resize_keeps_previous_aspect() {
        let mut camera = PerspectiveCamera::new(Deg(75.0), 1.5, 0.1, 100.0);
        camera.resize_projection(640.0, 0.0);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn initial_position_comes_from_config() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 1.0);
        assert_eq!(camera.position, Point3::new(1.0, 1.0, 2.0));
        assert_eq!(camera.up, Vector3::unit_y());
    }
}
