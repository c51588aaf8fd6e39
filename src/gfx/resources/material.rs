//! Material system
//!
//! One [`Material`] is shared by every node in the scene through a
//! [`SharedMaterial`] handle. Writes through any handle (the debug panel, the
//! orchestrator, a test) are seen by all nodes on the next draw, since the
//! GPU uniform is refreshed from the single instance every frame.
//!
//! Texture slots start out bound to a white placeholder and switch to the
//! real texture once it has been decoded and uploaded.

use std::{cell::RefCell, rc::Rc};

use wgpu::Device;

use crate::{
    error::{Result, StagehandError},
    gfx::resources::{texture_loader::TextureKey, texture_resource::TextureCache},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Reference-counted material handle; single-threaded by construction
pub type SharedMaterial = Rc<RefCell<Material>>;

/// Shading model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Colours surfaces by their view-space normal; ignores lights and textures
    Normal,
    /// Metalness/roughness shading lit by the scene's lights
    Standard,
}

/// Which faces are rasterised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Double,
}

impl Side {
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// Texture slots the shader samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Base colour, multiplied with `color`
    Map,
    /// Ambient occlusion (red channel), scaled by `ao_map_intensity`
    AoMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 2] = [TextureSlot::Map, TextureSlot::AoMap];

    fn index(self) -> usize {
        match self {
            TextureSlot::Map => 0,
            TextureSlot::AoMap => 1,
        }
    }
}

/// Numeric material parameters that can be edited live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialField {
    Metalness,
    Roughness,
    AoMapIntensity,
}

impl MaterialField {
    pub const ALL: [MaterialField; 3] = [
        MaterialField::Metalness,
        MaterialField::Roughness,
        MaterialField::AoMapIntensity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MaterialField::Metalness => "metalness",
            MaterialField::Roughness => "roughness",
            MaterialField::AoMapIntensity => "aoMapIntensity",
        }
    }

    /// Looks a field up by its display name
    ///
    /// Unknown names are an error rather than a silently dead control.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| StagehandError::UnknownMaterialField(name.to_string()))
    }
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub ao_map_intensity: f32,
    pub opacity: f32,
    /// 1.0 when the slot holds a real texture, 0.0 for the placeholder
    pub has_map: f32,
    pub has_ao_map: f32,
    _padding: [f32; 2],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// What a texture slot is currently bound to on the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundTexture {
    Placeholder,
    Texture(TextureKey),
}

struct MaterialGpu {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
    bound: [BoundTexture; 2],
}

/// Material definition
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub side: Side,
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub ao_map_intensity: f32,
    pub opacity: f32,
    maps: [Option<TextureKey>; 2],
    gpu: Option<MaterialGpu>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            kind: MaterialKind::Standard,
            side: Side::Front,
            color: [1.0, 1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            ao_map_intensity: 1.0,
            opacity: 1.0,
            maps: [None, None],
            gpu: None,
        }
    }
}

impl Material {
    /// Normal-direction material, like a debug view of the geometry
    pub fn normal(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MaterialKind::Normal,
            ..Default::default()
        }
    }

    /// Lit metalness/roughness material
    pub fn standard(name: &str, metalness: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            kind: MaterialKind::Standard,
            metalness: metalness.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Wraps the material for sharing between nodes
    pub fn into_shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_map(mut self, slot: TextureSlot, key: TextureKey) -> Self {
        self.set_map(slot, Some(key));
        self
    }

    pub fn set_map(&mut self, slot: TextureSlot, key: Option<TextureKey>) {
        self.maps[slot.index()] = key;
    }

    pub fn map(&self, slot: TextureSlot) -> Option<TextureKey> {
        self.maps[slot.index()]
    }

    pub fn field(&self, field: MaterialField) -> f32 {
        match field {
            MaterialField::Metalness => self.metalness,
            MaterialField::Roughness => self.roughness,
            MaterialField::AoMapIntensity => self.ao_map_intensity,
        }
    }

    pub fn set_field(&mut self, field: MaterialField, value: f32) {
        match field {
            MaterialField::Metalness => self.metalness = value,
            MaterialField::Roughness => self.roughness = value,
            MaterialField::AoMapIntensity => self.ao_map_intensity = value,
        }
    }

    /// Uniform contents for the current parameters and bound textures
    pub fn uniform(&self) -> MaterialUniform {
        let bound = |slot: TextureSlot| match &self.gpu {
            Some(gpu) if matches!(gpu.bound[slot.index()], BoundTexture::Texture(_)) => 1.0,
            _ => 0.0,
        };
        MaterialUniform {
            color: self.color,
            metalness: self.metalness,
            roughness: self.roughness,
            ao_map_intensity: self.ao_map_intensity,
            opacity: self.opacity,
            has_map: bound(TextureSlot::Map),
            has_ao_map: bound(TextureSlot::AoMap),
            _padding: [0.0; 2],
        }
    }

    /// What each slot should be bound to given the textures uploaded so far
    fn desired_bindings(&self, textures: &TextureCache) -> [BoundTexture; 2] {
        TextureSlot::ALL.map(|slot| match self.map(slot) {
            Some(key) if textures.contains(key) => BoundTexture::Texture(key),
            _ => BoundTexture::Placeholder,
        })
    }

    fn create_bind_group(
        &self,
        device: &Device,
        layout: &BindGroupLayoutWithDesc,
        ubo: &MaterialUBO,
        bound: &[BoundTexture; 2],
        textures: &TextureCache,
    ) -> wgpu::BindGroup {
        let view = |binding: BoundTexture| match binding {
            BoundTexture::Texture(key) => textures.view(key),
            BoundTexture::Placeholder => textures.placeholder_view(),
        };

        BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .texture(view(bound[TextureSlot::Map.index()]))
            .texture(view(bound[TextureSlot::AoMap.index()]))
            .sampler(textures.sampler())
            .create(device, &format!("Material Bind Group: {}", self.name))
    }

    /// Creates or refreshes GPU resources for this material
    ///
    /// Cheap to call every frame: the uniform write is skipped when nothing
    /// changed, and the bind group is only rebuilt when a slot moves from the
    /// placeholder to a freshly uploaded texture.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        textures: &TextureCache,
    ) {
        let desired = self.desired_bindings(textures);

        match self.gpu.take() {
            Some(mut gpu) => {
                if gpu.bound != desired {
                    log::debug!(
                        "Material '{}' rebinding textures: {:?} -> {:?}",
                        self.name,
                        gpu.bound,
                        desired
                    );
                    gpu.bind_group =
                        self.create_bind_group(device, layout, &gpu.ubo, &desired, textures);
                    gpu.bound = desired;
                }
                self.gpu = Some(gpu);
            }
            None => {
                let ubo = MaterialUBO::new(device);
                let bind_group = self.create_bind_group(device, layout, &ubo, &desired, textures);
                self.gpu = Some(MaterialGpu {
                    ubo,
                    bind_group,
                    bound: desired,
                });
            }
        }

        let uniform = self.uniform();
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.ubo.update_content(queue, uniform);
        }
    }

    /// Gets the bind group for rendering
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// Layout for the material bind group: uniform, colour map, AO map, sampler
pub fn material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::sampler(
            wgpu::SamplerBindingType::Filtering,
        ))
        .create(device, "Material Bind Group Layout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in MaterialField::ALL {
            assert_eq!(MaterialField::from_name(field.name()).unwrap(), field);
        }
    }

    #[test]
    fn misspelled_field_is_rejected() {
        let err = MaterialField::from_name("metalnes").unwrap_err();
        assert!(matches!(err, StagehandError::UnknownMaterialField(ref name) if name == "metalnes"));
    }

    #[test]
    fn standard_material_clamps_parameters() {
        let material = Material::standard("m", 1.5, -0.2);
        assert_eq!(material.metalness, 1.0);
        assert_eq!(material.roughness, 0.0);
        assert_eq!(material.kind, MaterialKind::Standard);
    }

    #[test]
    fn writes_through_one_handle_are_seen_by_all() {
        let shared = Material::standard("shared", 0.45, 0.65).into_shared();
        let handles: Vec<SharedMaterial> = (0..3).map(|_| Rc::clone(&shared)).collect();

        handles[0]
            .borrow_mut()
            .set_field(MaterialField::Roughness, 0.1);

        for handle in &handles {
            assert_eq!(handle.borrow().roughness, 0.1);
            assert_eq!(handle.borrow().uniform().roughness, 0.1);
        }
    }

    #[test]
    fn uniform_reports_placeholder_before_upload() {
        let material = Material::standard("m", 0.0, 1.0)
            .with_map(TextureSlot::Map, TextureKey::DoorColor)
            .with_map(TextureSlot::AoMap, TextureKey::DoorAmbientOcclusion);
        let uniform = material.uniform();
        assert_eq!(uniform.has_map, 0.0);
        assert_eq!(uniform.has_ao_map, 0.0);
        assert_eq!(material.map(TextureSlot::Map), Some(TextureKey::DoorColor));
    }

    #[test]
    fn double_side_disables_culling() {
        assert_eq!(Side::Double.cull_mode(), None);
        assert_eq!(Side::Front.cull_mode(), Some(wgpu::Face::Back));
    }

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }
}
