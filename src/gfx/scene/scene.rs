use std::rc::Rc;

use wgpu::Device;

use crate::{
    gfx::{
        camera::camera_utils::CameraManager,
        resources::{global_bindings::LightingState, material::SharedMaterial},
        scene::{light::Light, object::Node},
    },
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

/// Scene graph root: nodes, lights and the camera that views them
///
/// Built once at startup. Afterwards only node transforms and the shared
/// material change.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub nodes: Vec<Node>,
    pub lights: Vec<Light>,
    material: SharedMaterial,
}

impl Scene {
    pub fn new(camera_manager: CameraManager, material: SharedMaterial) -> Self {
        Self {
            camera_manager,
            nodes: Vec::new(),
            lights: Vec::new(),
            material,
        }
    }

    /// Adds a node; nodes must share the scene's material
    pub fn add_node(&mut self, node: Node) {
        debug_assert!(
            Rc::ptr_eq(&node.material, &self.material),
            "node '{}' does not use the scene material",
            node.name
        );
        self.nodes.push(node);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// The single material every node references
    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Poses every node for `elapsed` seconds since start
    pub fn animate(&mut self, elapsed: f32) {
        for node in &mut self.nodes {
            node.animate(elapsed);
        }
    }

    /// Steps the controls and refreshes camera matrices
    pub fn update(&mut self) -> bool {
        self.camera_manager.update()
    }

    pub fn lighting(&self) -> LightingState {
        LightingState::from_lights(&self.lights)
    }

    /// Creates vertex/index buffers and transform uniforms for every node
    pub fn init_gpu_resources(&mut self, device: &Device, object_layout: &BindGroupLayoutWithDesc) {
        for node in &mut self.nodes {
            node.init_gpu_resources(device, object_layout);
        }
    }

    /// Syncs visible node transforms to the GPU
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for node in self.nodes.iter_mut().filter(|node| node.visible) {
            node.update_transform(queue);
        }
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            node_count: self.nodes.len(),
            light_count: self.lights.len(),
            total_triangles: self
                .nodes
                .iter()
                .map(|node| node.mesh.index_count() / 3)
                .sum(),
            total_vertices: self.nodes.iter().map(|node| node.mesh.vertex_count()).sum(),
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub light_count: usize,
    pub total_triangles: u32,
    pub total_vertices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{orbit_controls::OrbitControls, perspective_camera::PerspectiveCamera},
        geometry::GeometryDescriptor,
        resources::material::{Material, MaterialField},
    };
    use cgmath::{Deg, Point3};

    fn scene() -> Scene {
        let camera = PerspectiveCamera::new(Deg(75.0), 1.0, 0.1, 100.0);
        let controls = OrbitControls::new(Point3::new(0.0, 0.0, 0.0));
        let material = Material::standard("shared", 0.45, 0.65).into_shared();
        let mut scene = Scene::new(CameraManager::new(camera, controls), Rc::clone(&material));
        scene.add_node(Node::new(
            "plane",
            GeometryDescriptor::Plane {
                width: 1.0,
                height: 2.0,
                width_segments: 3,
                height_segments: 3,
            },
            Rc::clone(&material),
        ));
        scene
    }

    #[test]
    fn lookup_by_name() {
        let scene = scene();
        assert!(scene.node("plane").is_some());
        assert!(scene.node("cube").is_none());
    }

    #[test]
    fn statistics_count_triangles() {
        let stats = scene().get_statistics();
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.total_vertices, 16);
        assert_eq!(stats.total_triangles, 18);
    }

    #[test]
    fn material_edits_are_visible_through_nodes() {
        let scene = scene();
        scene
            .material()
            .borrow_mut()
            .set_field(MaterialField::Metalness, 0.9);
        let node = scene.node("plane").unwrap();
        assert_eq!(node.material.borrow().metalness, 0.9);
    }
}
