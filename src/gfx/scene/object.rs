use cgmath::{Euler, Matrix, Matrix4, Rad, SquareMatrix, Vector3};
use wgpu::Device;

use crate::{
    gfx::{
        geometry::{GeometryData, GeometryDescriptor},
        resources::material::SharedMaterial,
        scene::{animation::Spin, vertex::Vertex3D},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// CPU-side geometry plus its GPU buffers once uploaded
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn from_geometry(data: &GeometryData) -> Self {
        Self {
            vertices: data.to_vertices(),
            indices: data.indices.clone(),
            vertex_buffer: None,
            index_buffer: None,
            index_count: data.indices.len() as u32,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    fn upload(&mut self, device: &Device, label: &str) {
        self.vertex_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", label)),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.index_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", label)),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }
}

/// Position, Euler rotation (XYZ order) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Model matrix: T * Rx * Ry * Rz * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(self.rotation.x)
            * Matrix4::from_angle_y(self.rotation.y)
            * Matrix4::from_angle_z(self.rotation.z)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Per-node uniform: model matrix and its normal matrix
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn from_matrix(model: Matrix4<f32>) -> Self {
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: model.into(),
            normal: normal.into(),
        }
    }
}

type ObjectUBO = UniformBuffer<ObjectUniform>;

pub struct NodeGpuResources {
    ubo: ObjectUBO,
    bind_group: wgpu::BindGroup,
}

/// A renderable mesh in the scene graph
pub struct Node {
    pub name: String,
    pub geometry: GeometryDescriptor,
    pub mesh: Mesh,
    pub material: SharedMaterial,
    pub transform: Transform,
    pub visible: bool,
    pub spin: Option<Spin>,
    gpu_resources: Option<NodeGpuResources>,
}

impl Node {
    pub fn new(name: &str, geometry: GeometryDescriptor, material: SharedMaterial) -> Self {
        let mesh = Mesh::from_geometry(&geometry.build());
        Self {
            name: name.to_string(),
            geometry,
            mesh,
            material,
            transform: Transform::default(),
            visible: true,
            spin: None,
            gpu_resources: None,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = Some(spin);
        self
    }

    /// Sets the rotation for `elapsed` seconds of spin; no-op without a spin
    pub fn animate(&mut self, elapsed: f32) {
        if let Some(spin) = self.spin {
            spin.apply(&mut self.transform.rotation, elapsed);
        }
    }

    pub fn uniform(&self) -> ObjectUniform {
        ObjectUniform::from_matrix(self.transform.matrix())
    }

    pub fn init_gpu_resources(&mut self, device: &Device, layout: &BindGroupLayoutWithDesc) {
        log::debug!(
            "Uploading {} '{}': {} vertices, {} indices",
            self.geometry.kind_name(),
            self.name,
            self.mesh.vertex_count(),
            self.mesh.index_count()
        );
        self.mesh.upload(device, &self.name);

        let ubo = ObjectUBO::new_with_data(device, &self.uniform());
        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .create(device, &format!("Transform Bind Group: {}", self.name));

        self.gpu_resources = Some(NodeGpuResources { ubo, bind_group });
    }

    /// Syncs the model matrix to the GPU if resources exist
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        let uniform = self.uniform();
        if let Some(gpu) = self.gpu_resources.as_mut() {
            gpu.ubo.update_content(queue, uniform);
        }
    }

    pub fn transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }
}

/// Layout for the per-node transform bind group (slot 1)
pub fn object_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_vertex(binding_types::uniform())
        .create(device, "Transform Bind Group Layout")
}

pub trait DrawNode<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_node(&mut self, node: &'a Node);
}

impl<'a, 'b> DrawNode<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return;
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    /// Binds the node's transform (group 1) and draws it; material binding is the caller's
    fn draw_node(&mut self, node: &'b Node) {
        let Some(bind_group) = node.transform_bind_group() else {
            return;
        };
        self.set_bind_group(1, bind_group, &[]);
        self.draw_mesh(&node.mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        resources::material::Material,
        scene::animation::{Axis, Spin},
    };
    use cgmath::{InnerSpace, Vector4};

    fn sphere() -> GeometryDescriptor {
        GeometryDescriptor::Sphere {
            radius: 0.5,
            width_segments: 16,
            height_segments: 16,
        }
    }

    #[test]
    fn new_node_has_identity_transform_and_mesh_data() {
        let node = Node::new("sphere", sphere(), Material::normal("m").into_shared());
        assert_eq!(node.transform, Transform::default());
        assert_eq!(node.mesh.vertex_count(), 289);
        assert_eq!(node.mesh.index_count(), 1440);
        assert!(!node.mesh.is_uploaded());
        assert!(node.transform_bind_group().is_none());
    }

    #[test]
    fn matrix_applies_translation_last() {
        let mut transform = Transform::at(Vector3::new(2.0, 0.0, 0.0));
        transform.rotation.z = Rad(std::f32::consts::FRAC_PI_2);
        let p = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn animate_without_spin_keeps_rotation() {
        let mut node = Node::new("still", sphere(), Material::normal("m").into_shared());
        node.animate(5.0);
        assert_eq!(node.transform.rotation, Transform::default().rotation);

        let mut spinning = Node::new("spin", sphere(), Material::normal("m").into_shared())
            .with_spin(Spin::new(Axis::X, 0.3));
        spinning.animate(1.0);
        assert!((spinning.transform.rotation.x.0 - 0.3).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_keeps_normals_unit_under_rotation() {
        let mut transform = Transform::default();
        transform.rotation.y = Rad(0.7);
        let uniform = ObjectUniform::from_matrix(transform.matrix());
        let normal = Matrix4::from(uniform.normal) * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((normal.truncate().magnitude() - 1.0).abs() < 1e-5);
    }
}
