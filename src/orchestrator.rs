//! Scene orchestration
//!
//! [`Orchestrator`] owns the per-process state (viewport, scene, clock,
//! texture loads, shutdown signal). It builds the scene once, reacts to
//! resizes and advances the animation each frame. Nothing here touches the
//! GPU; the app layer hands the result to the render engine.

use std::{
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use cgmath::{Point3, Rad};

use crate::{
    clock::Clock,
    config::{DemoConfig, SceneVariant},
    gfx::{
        camera::{
            camera_utils::CameraManager, orbit_controls::OrbitControls,
            perspective_camera::PerspectiveCamera,
        },
        geometry::GeometryDescriptor,
        resources::{
            material::{Material, SharedMaterial, Side, TextureSlot},
            texture_loader::{TextureKey, TextureLibrary},
        },
        scene::{
            animation::{Axis, Spin},
            light::Light,
            object::Node,
            scene::Scene,
        },
    },
    ui::panel::{debug_params, DebugParam, FrameInfo},
    viewport::Viewport,
};

pub const SPHERE: &str = "sphere";
pub const PLANE: &str = "plane";
pub const TORUS: &str = "torus";

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Cloneable flag that ends the frame loop once triggered
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whether the loop should keep going after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Continue,
    Stop,
}

/// The shared material for a variant
pub fn build_material(variant: SceneVariant) -> SharedMaterial {
    let material = match variant {
        SceneVariant::Normal => Material::normal("normal").with_side(Side::Double),
        SceneVariant::Lit => Material::standard("standard", 0.45, 0.65)
            .with_map(TextureSlot::Map, TextureKey::DoorColor)
            .with_map(TextureSlot::AoMap, TextureKey::DoorAmbientOcclusion),
    };
    material.into_shared()
}

/// Builds the scene graph: three spinning meshes, camera, controls and lights
pub fn build_scene(config: &DemoConfig, aspect: f32) -> Scene {
    let mut camera = PerspectiveCamera::from_config(&config.camera, aspect);
    let controls = OrbitControls::new(Point3::new(0.0, 0.0, 0.0))
        .with_damping(config.enable_damping, config.damping_factor);
    camera.update_view_proj();

    let material = build_material(config.variant);
    let mut scene = Scene::new(CameraManager::new(camera, controls), Rc::clone(&material));
    let speed = config.rotation_speed;

    scene.add_node(
        Node::new(
            SPHERE,
            GeometryDescriptor::Sphere {
                radius: 0.5,
                width_segments: 16,
                height_segments: 16,
            },
            Rc::clone(&material),
        )
        .with_spin(Spin::new(Axis::Y, speed)),
    );
    scene.add_node(
        Node::new(
            PLANE,
            GeometryDescriptor::Plane {
                width: 1.0,
                height: 2.0,
                width_segments: 3,
                height_segments: 3,
            },
            Rc::clone(&material),
        )
        .with_position(2.0, 0.0, 0.0)
        .with_spin(Spin::new(Axis::Z, speed)),
    );
    scene.add_node(
        Node::new(
            TORUS,
            GeometryDescriptor::Torus {
                radius: 0.5,
                tube: 0.2,
                radial_segments: 16,
                tubular_segments: 32,
            },
            material,
        )
        .with_position(-2.0, 0.0, 0.0)
        .with_spin(Spin::new(Axis::X, speed)),
    );

    if config.variant.has_lights() {
        scene.add_light(Light::ambient(WHITE, 0.5));
        scene.add_light(Light::point(WHITE, 0.5, Point3::new(2.0, 3.0, 4.0)));
    }

    scene
}

pub struct Orchestrator {
    config: DemoConfig,
    pub viewport: Viewport,
    pub scene: Scene,
    clock: Clock,
    textures: TextureLibrary,
    shutdown: ShutdownSignal,
    debug_params: Option<[DebugParam; 3]>,
    ready_textures: Vec<TextureKey>,
    pending_scale_factor: Option<f64>,
}

impl Orchestrator {
    /// Builds the scene for `viewport` and starts the texture loads
    pub fn setup(config: DemoConfig, viewport: Viewport) -> Self {
        let textures = TextureLibrary::load_all(config.asset_root.clone());
        let scene = build_scene(&config, viewport.aspect());
        let debug_params = config.variant.has_debug_panel().then(debug_params);

        let stats = scene.get_statistics();
        log::info!(
            "Built {:?} scene: {} nodes, {} lights, {} triangles",
            config.variant,
            stats.node_count,
            stats.light_count,
            stats.total_triangles
        );

        Self {
            config,
            viewport,
            scene,
            clock: Clock::start(),
            textures,
            shutdown: ShutdownSignal::new(),
            debug_params,
            ready_textures: Vec::new(),
            pending_scale_factor: None,
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Replaces the shutdown flag with one owned by the host loop
    pub fn adopt_shutdown_signal(&mut self, signal: ShutdownSignal) {
        self.shutdown = signal;
    }

    pub fn textures(&self) -> &TextureLibrary {
        &self.textures
    }

    /// Controls for the debug panel; `None` when the variant has no panel
    pub fn debug_params(&self) -> Option<&[DebugParam]> {
        self.debug_params.as_ref().map(|params| params.as_slice())
    }

    pub fn material(&self) -> &SharedMaterial {
        self.scene.material()
    }

    /// Seconds since setup
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed_seconds()
    }

    /// Applies a window resize in logical pixels
    ///
    /// Updates the viewport and camera projection. Zero-sized resizes
    /// are ignored. Returns the new drawing-buffer size when it applied.
    pub fn resize(&mut self, width: f64, height: f64, host_pixel_ratio: f64) -> Option<(u32, u32)> {
        if !self.viewport.resize(width, height, host_pixel_ratio) {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return None;
        }
        self.apply_viewport()
    }

    /// Physical-pixel counterpart of [`Orchestrator::resize`]
    pub fn resize_physical(&mut self, width: u32, height: u32, scale_factor: f64) -> Option<(u32, u32)> {
        if !self.viewport.resize_physical(width, height, scale_factor) {
            log::debug!("Ignoring resize to {}x{} physical", width, height);
            return None;
        }
        self.apply_viewport()
    }

    /// Records a DPI change to apply once the window has its new size
    pub fn scale_factor_changed(&mut self, scale_factor: f64) {
        self.pending_scale_factor = Some(scale_factor);
    }

    /// Applies a recorded DPI change against the window's settled physical size
    pub fn apply_pending_scale_factor(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        let scale_factor = self.pending_scale_factor.take()?;
        self.resize_physical(width, height, scale_factor)
    }

    fn apply_viewport(&mut self) -> Option<(u32, u32)> {
        let camera = &mut self.scene.camera_manager.camera;
        camera.resize_projection(self.viewport.width, self.viewport.height);
        camera.update_view_proj();
        let buffer = self.viewport.drawing_buffer_size();
        log::debug!(
            "Viewport {:.0}x{:.0} @{}x, drawing buffer {}x{}",
            self.viewport.width,
            self.viewport.height,
            self.viewport.pixel_ratio,
            buffer.0,
            buffer.1
        );
        Some(buffer)
    }

    /// Advances one frame at the clock's current time
    pub fn frame(&mut self) -> FrameState {
        let elapsed = self.elapsed();
        self.advance(elapsed)
    }

    /// Advances one frame at `elapsed` seconds
    ///
    /// Polls texture loads, poses every node and steps the controls. Returns
    /// [`FrameState::Stop`] once shutdown has been requested.
    pub fn advance(&mut self, elapsed: f32) -> FrameState {
        if self.shutdown.is_triggered() {
            return FrameState::Stop;
        }

        let ready = self.textures.poll();
        if !ready.is_empty() {
            self.ready_textures.extend(ready);
        }

        self.scene.animate(elapsed);
        self.scene.update();
        FrameState::Continue
    }

    /// Textures that finished decoding since the last call, ready to upload
    pub fn take_ready_textures(&mut self) -> Vec<TextureKey> {
        std::mem::take(&mut self.ready_textures)
    }

    pub fn frame_info(&self, elapsed: f32) -> FrameInfo {
        FrameInfo {
            elapsed,
            viewport: (self.viewport.width, self.viewport.height),
            pixel_ratio: self.viewport.pixel_ratio,
            textures: TextureKey::ALL
                .into_iter()
                .map(|key| (key, self.textures.status(key)))
                .collect(),
        }
    }

    /// Current rotation of a named node, for inspection
    pub fn node_rotation(&self, name: &str) -> Option<(Rad<f32>, Rad<f32>, Rad<f32>)> {
        self.scene.node(name).map(|node| {
            let rotation = node.transform.rotation;
            (rotation.x, rotation.y, rotation.z)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::{
        material::{MaterialField, MaterialKind},
        LoadStatus,
    };
    use cgmath::Vector3;

    fn config(variant: SceneVariant) -> DemoConfig {
        DemoConfig::default()
            .with_variant(variant)
            .with_asset_root(std::env::temp_dir().join("stagehand-no-assets"))
    }

    fn orchestrator(variant: SceneVariant) -> Orchestrator {
        Orchestrator::setup(config(variant), Viewport::new(800.0, 600.0, 1.0, 2.0))
    }

    #[test]
    fn nodes_start_at_fixed_offsets() {
        let orch = orchestrator(SceneVariant::Lit);
        let position = |name| orch.scene.node(name).unwrap().transform.position;
        assert_eq!(position(TORUS), Vector3::new(-2.0, 0.0, 0.0));
        assert_eq!(position(SPHERE), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(position(PLANE), Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn each_node_spins_about_its_own_axis() {
        let mut orch = orchestrator(SceneVariant::Normal);
        assert_eq!(orch.advance(10.0), FrameState::Continue);

        let (x, y, z) = orch.node_rotation(SPHERE).unwrap();
        assert!((y.0 - 3.0).abs() < 1e-5);
        assert_eq!((x.0, z.0), (0.0, 0.0));

        let (x, y, z) = orch.node_rotation(TORUS).unwrap();
        assert!((x.0 - 3.0).abs() < 1e-5);
        assert_eq!((y.0, z.0), (0.0, 0.0));

        let (x, y, z) = orch.node_rotation(PLANE).unwrap();
        assert!((z.0 - 3.0).abs() < 1e-5);
        assert_eq!((x.0, y.0), (0.0, 0.0));
    }

    #[test]
    fn rotation_depends_only_on_elapsed_time() {
        let mut orch = orchestrator(SceneVariant::Lit);
        for t in [0.5_f32, 3.0, 1.25] {
            orch.advance(t);
            let (_, y, _) = orch.node_rotation(SPHERE).unwrap();
            assert!((y.0 - 0.3 * t).abs() < 1e-6);
        }
    }

    #[test]
    fn resize_keeps_aspect_in_step_with_viewport() {
        let mut orch = orchestrator(SceneVariant::Lit);
        assert!((orch.scene.camera_manager.camera.aspect - 1.3333).abs() < 1e-4);

        let buffer = orch.resize(1024.0, 768.0, 1.0);
        assert_eq!(buffer, Some((1024, 768)));
        assert!((orch.scene.camera_manager.camera.aspect - 1.3333).abs() < 1e-4);
    }

    #[test]
    fn drawing_buffer_uses_clamped_pixel_ratio() {
        let mut orch = orchestrator(SceneVariant::Lit);
        assert_eq!(orch.resize(640.0, 480.0, 3.0), Some((1280, 960)));
        assert_eq!(orch.viewport.pixel_ratio, 2.0);
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let mut orch = orchestrator(SceneVariant::Lit);
        orch.resize(1024.0, 768.0, 1.5);
        let viewport = orch.viewport;
        let aspect = orch.scene.camera_manager.camera.aspect;

        orch.resize(1024.0, 768.0, 1.5);
        assert_eq!(orch.viewport, viewport);
        assert_eq!(orch.scene.camera_manager.camera.aspect, aspect);
    }

    #[test]
    fn scale_change_waits_for_the_settled_window_size() {
        let mut orch = orchestrator(SceneVariant::Lit);
        let before = orch.viewport;
        orch.scale_factor_changed(2.0);
        assert_eq!(orch.viewport, before);

        assert_eq!(orch.apply_pending_scale_factor(1600, 1200), Some((1600, 1200)));
        assert_eq!(orch.viewport.width, 800.0);
        assert_eq!(orch.viewport.height, 600.0);
        assert_eq!(orch.viewport.pixel_ratio, 2.0);

        assert_eq!(orch.apply_pending_scale_factor(1600, 1200), None);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut orch = orchestrator(SceneVariant::Lit);
        let before = orch.viewport;
        assert_eq!(orch.resize(0.0, 600.0, 1.0), None);
        assert_eq!(orch.viewport, before);
    }

    #[test]
    fn debug_edits_reach_all_three_nodes() {
        let orch = orchestrator(SceneVariant::Lit);
        let params = orch.debug_params().unwrap();
        let roughness = params
            .iter()
            .find(|p| p.field == MaterialField::Roughness)
            .unwrap();
        roughness.apply(orch.material(), 0.2);

        for name in [SPHERE, PLANE, TORUS] {
            let node = orch.scene.node(name).unwrap();
            assert!(Rc::ptr_eq(&node.material, orch.material()));
            assert!((node.material.borrow().roughness - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn variants_differ_in_material_lights_and_panel() {
        let normal = orchestrator(SceneVariant::Normal);
        assert_eq!(normal.material().borrow().kind, MaterialKind::Normal);
        assert_eq!(normal.material().borrow().side, Side::Double);
        assert!(normal.scene.lights.is_empty());
        assert!(normal.debug_params().is_none());

        let lit = orchestrator(SceneVariant::Lit);
        let material = lit.material().borrow();
        assert_eq!(material.kind, MaterialKind::Standard);
        assert_eq!(material.metalness, 0.45);
        assert_eq!(material.roughness, 0.65);
        assert_eq!(material.map(TextureSlot::Map), Some(TextureKey::DoorColor));
        assert_eq!(lit.scene.lights.len(), 2);
        assert_eq!(lit.debug_params().map(<[DebugParam]>::len), Some(3));
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut orch = orchestrator(SceneVariant::Lit);
        let signal = orch.shutdown_signal();
        assert_eq!(orch.frame(), FrameState::Continue);

        signal.trigger();
        assert_eq!(orch.frame(), FrameState::Stop);
        assert!(orch.shutdown_signal().is_triggered());
    }

    #[test]
    fn adopted_signal_is_observed() {
        let mut orch = orchestrator(SceneVariant::Normal);
        let host = ShutdownSignal::new();
        orch.adopt_shutdown_signal(host.clone());
        host.trigger();
        assert_eq!(orch.advance(1.0), FrameState::Stop);
    }

    #[test]
    fn decoded_texture_is_handed_out_once() {
        let root = std::env::temp_dir().join(format!("stagehand-ready-{}", std::process::id()));
        let path = root.join(TextureKey::Matcap.relative_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let config = DemoConfig::default().with_asset_root(root.clone());
        let mut orch = Orchestrator::setup(config, Viewport::new(800.0, 600.0, 1.0, 2.0));

        let mut frames = 0;
        while orch.textures().status(TextureKey::Matcap) == LoadStatus::Pending {
            assert!(frames < 500, "matcap never finished decoding");
            orch.advance(frames as f32 / 60.0);
            std::thread::sleep(std::time::Duration::from_millis(10));
            frames += 1;
        }
        // Settle the remaining (missing) assets too
        orch.advance(frames as f32 / 60.0);

        assert_eq!(orch.textures().status(TextureKey::Matcap), LoadStatus::Ready);
        assert_eq!(orch.take_ready_textures(), vec![TextureKey::Matcap]);
        assert!(orch.take_ready_textures().is_empty());
        assert_eq!(orch.textures().image(TextureKey::Matcap).map(|i| i.width), Some(2));
    }

    #[test]
    fn camera_starts_at_configured_position() {
        let orch = orchestrator(SceneVariant::Lit);
        let camera = &orch.scene.camera_manager.camera;
        assert_eq!(camera.position, Point3::new(1.0, 1.0, 2.0));
        assert_eq!(camera.znear, 0.1);
        assert_eq!(camera.zfar, 100.0);
    }
}
