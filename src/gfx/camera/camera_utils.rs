use cgmath::{Matrix4, SquareMatrix};
use winit::event::{DeviceEvent, WindowEvent};

use super::{orbit_controls::OrbitControls, perspective_camera::PerspectiveCamera};

/// Camera plus the controls that drive it
///
/// The scene owns exactly one of these.
pub struct CameraManager {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
}

impl CameraManager {
    pub fn new(camera: PerspectiveCamera, controls: OrbitControls) -> Self {
        Self { camera, controls }
    }

    /// Feeds window-level input (buttons, wheel, modifiers) to the controls
    pub fn process_window_event(&mut self, event: &WindowEvent, viewport_height: f64) {
        self.controls
            .process_window_event(event, viewport_height, &self.camera);
    }

    /// Feeds raw mouse motion to the controls
    pub fn process_device_event(&mut self, event: &DeviceEvent, viewport_height: f64) {
        self.controls
            .process_device_event(event, viewport_height, &self.camera);
    }

    /// Advances control damping by one step and refreshes the camera uniform
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&mut self) -> bool {
        let moved = self.controls.update(&mut self.camera);
        self.camera.update_view_proj();
        moved
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],

    /// World-to-view matrix, used by the normal shader for view-space normals.
    pub view: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
        }
    }
}
