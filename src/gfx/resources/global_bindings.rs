//! Global uniform bindings for camera and light data
//!
//! Everything shared by all draws in a frame lives in one uniform buffer bound
//! at group 0 in every pipeline.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, scene::light::Light},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    /// rgb = summed ambient colour * intensity
    ambient: [f32; 4],
    /// xyz = position, w = 1 when a point light is present
    point_position: [f32; 4],
    /// rgb = colour, w = intensity
    point_color: [f32; 4],
}
// 16 + 64 + 64 + 16 + 16 + 16 = 192 bytes

/// Lighting reduced to what the shaders consume
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LightingState {
    pub ambient: [f32; 3],
    pub point: Option<(cgmath::Point3<f32>, [f32; 3], f32)>,
}

impl LightingState {
    /// Sums ambient lights and keeps the first point light
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut state = LightingState::default();
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    for (channel, c) in state.ambient.iter_mut().zip(color) {
                        *channel += c * intensity;
                    }
                }
                Light::Point {
                    color,
                    intensity,
                    position,
                } => {
                    if state.point.is_none() {
                        state.point = Some((position, color, intensity));
                    } else {
                        log::warn!("Only one point light is supported; ignoring extra light");
                    }
                }
            }
        }
        state
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

pub fn global_content(camera: &CameraUniform, lighting: &LightingState) -> GlobalUBOContent {
    let (point_position, point_color) = match lighting.point {
        Some((position, color, intensity)) => (
            [position.x, position.y, position.z, 1.0],
            [color[0], color[1], color[2], intensity],
        ),
        None => ([0.0; 4], [0.0; 4]),
    };

    GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        view: camera.view,
        ambient: [
            lighting.ambient[0],
            lighting.ambient[1],
            lighting.ambient[2],
            0.0,
        ],
        point_position,
        point_color,
    }
}

/// Updates the global uniform buffer with camera and light data
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    lighting: &LightingState,
) {
    ubo.update_content(queue, global_content(camera, lighting));
}

/// Bind group layout and bind group for global uniforms (slot 0)
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn no_lights_means_dark_ambient_and_no_point() {
        let state = LightingState::from_lights(&[]);
        assert_eq!(state, LightingState::default());
        let content = global_content(&CameraUniform::default(), &state);
        assert_eq!(content.point_position[3], 0.0);
    }

    #[test]
    fn lit_scene_lights_reduce_to_uniform() {
        let lights = [
            Light::ambient([1.0, 1.0, 1.0], 0.5),
            Light::point([1.0, 1.0, 1.0], 0.5, Point3::new(2.0, 3.0, 4.0)),
        ];
        let state = LightingState::from_lights(&lights);
        assert_eq!(state.ambient, [0.5, 0.5, 0.5]);

        let content = global_content(&CameraUniform::default(), &state);
        assert_eq!(content.point_position, [2.0, 3.0, 4.0, 1.0]);
        assert_eq!(content.point_color, [1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn content_size_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 192);
    }
}
