//! WGPU-based rendering engine
//!
//! Owns the surface, device and queue, the depth buffer, the uploaded
//! textures and one pipeline per material kind/side. Each frame it syncs the
//! scene's uniforms, draws every visible node with the shared material and
//! hands the encoder to an optional UI overlay.

use std::{borrow::Cow, sync::Arc};
use wgpu::TextureFormat;

use crate::{
    error::Result,
    gfx::{
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
            material::{material_bind_group_layout, MaterialKind, Side},
            texture_loader::{DecodedImage, TextureKey},
            texture_resource::{TextureCache, TextureResource},
        },
        scene::{
            object::{object_bind_group_layout, DrawNode},
            scene::Scene,
        },
    },
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::pipeline_manager::{
    material_pipeline_name, shader_source, PipelineConfig, PipelineManager, NORMAL_SHADER,
    STANDARD_SHADER,
};

/// What to do when the next surface texture cannot be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameErrorAction {
    /// Reconfigure the surface and skip this frame
    Reconfigure,
    /// Skip this frame and try again next time
    Skip,
    /// Unrecoverable
    Fatal,
}

impl FrameErrorAction {
    pub fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameErrorAction::Reconfigure,
            wgpu::SurfaceError::Timeout => FrameErrorAction::Skip,
            wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other => FrameErrorAction::Fatal,
        }
    }
}

/// `image` itself if it fits in a `limit`-sized texture, else a downscaled copy
fn fit_to_limit(image: &DecodedImage, limit: u32) -> Option<Cow<'_, DecodedImage>> {
    if image.fits_within(limit) {
        Some(Cow::Borrowed(image))
    } else {
        image.downscaled_to(limit).map(Cow::Owned)
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    textures: TextureCache,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`
    ///
    /// `width`/`height` are the drawing-buffer size in physical pixels.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);
        log::debug!("Surface format {:?}", format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let object_layout = object_bind_group_layout(&device);
        let material_layout = material_bind_group_layout(&device);
        let textures = TextureCache::new(&device, &queue);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        for shader in [NORMAL_SHADER, STANDARD_SHADER] {
            if let Some(source) = shader_source(shader) {
                pipeline_manager.load_shader(shader, source);
            }
        }
        let layouts = vec![
            global_bindings.bind_group_layout().clone(),
            object_layout.layout.clone(),
            material_layout.layout.clone(),
        ];
        for kind in [MaterialKind::Normal, MaterialKind::Standard] {
            let shader = match kind {
                MaterialKind::Normal => NORMAL_SHADER,
                MaterialKind::Standard => STANDARD_SHADER,
            };
            for side in [Side::Front, Side::Back, Side::Double] {
                let name = material_pipeline_name(kind, side);
                pipeline_manager.register_pipeline(
                    &name,
                    PipelineConfig::default_with_shader(shader)
                        .with_label(&name)
                        .with_bind_group_layouts(layouts.clone())
                        .with_cull_mode(side.cull_mode())
                        .with_depth_format(TextureResource::DEPTH_FORMAT)
                        .with_color_format(format),
                );
            }
        }
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_layout,
            material_layout,
            textures,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Creates mesh buffers, transform uniforms and material bindings
    pub fn init_scene(&mut self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.object_layout);
        self.sync_material(scene);
    }

    /// Uploads a decoded image; the material picks it up on its next sync
    ///
    /// Images larger than the device allows are downscaled first. If that
    /// fails the slot keeps its placeholder.
    pub fn upload_texture(&mut self, key: TextureKey, image: &DecodedImage) {
        let limit = self.device.limits().max_texture_dimension_2d;
        match fit_to_limit(image, limit) {
            Some(fitted) => {
                if fitted.width != image.width || fitted.height != image.height {
                    log::warn!(
                        "Texture {} is {}x{}, above the {} limit; downscaled to {}x{}",
                        key,
                        image.width,
                        image.height,
                        limit,
                        fitted.width,
                        fitted.height
                    );
                }
                self.textures.upload(&self.device, &self.queue, key, &fitted);
            }
            None => log::warn!(
                "Texture {} is {}x{}, above the {} limit; keeping placeholder",
                key,
                image.width,
                image.height,
                limit
            ),
        }
    }

    fn sync_material(&self, scene: &Scene) {
        scene.material().borrow_mut().update_gpu_resources(
            &self.device,
            &self.queue,
            &self.material_layout,
            &self.textures,
        );
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Renders one frame of `scene`, then the optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &mut Scene, ui_callback: Option<F>) -> Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            &scene.camera_manager.camera.uniform,
            &scene.lighting(),
        );
        scene.update_all_transforms(&self.queue);
        self.sync_material(scene);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                return match FrameErrorAction::for_error(&err) {
                    FrameErrorAction::Reconfigure => {
                        log::warn!("Surface {:?}; reconfiguring", err);
                        self.reconfigure();
                        Ok(())
                    }
                    FrameErrorAction::Skip => {
                        log::warn!("Surface {:?}; skipping frame", err);
                        Ok(())
                    }
                    FrameErrorAction::Fatal => Err(err.into()),
                };
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let material = scene.material().borrow();
            let pipeline_name = material_pipeline_name(material.kind, material.side);

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            match (
                self.pipeline_manager.pipeline(&pipeline_name),
                material.bind_group(),
            ) {
                (Some(pipeline), Some(material_bind_group)) => {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(2, material_bind_group, &[]);
                    for node in scene.nodes.iter().filter(|node| node.visible) {
                        render_pass.draw_node(node);
                    }
                }
                (None, _) => log::warn!("Pipeline '{}' unavailable; nothing drawn", pipeline_name),
                (_, None) => log::warn!("Material '{}' has no GPU resources", material.name),
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the drawing buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }
        log::debug!("Resizing surface to {}x{}", width, height);

        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_surfaces_are_reconfigured() {
        assert_eq!(
            FrameErrorAction::for_error(&wgpu::SurfaceError::Lost),
            FrameErrorAction::Reconfigure
        );
        assert_eq!(
            FrameErrorAction::for_error(&wgpu::SurfaceError::Outdated),
            FrameErrorAction::Reconfigure
        );
        assert_eq!(
            FrameErrorAction::for_error(&wgpu::SurfaceError::Timeout),
            FrameErrorAction::Skip
        );
        assert_eq!(
            FrameErrorAction::for_error(&wgpu::SurfaceError::OutOfMemory),
            FrameErrorAction::Fatal
        );
    }

    #[test]
    fn textures_within_the_limit_upload_as_is() {
        let image = DecodedImage {
            width: 32,
            height: 16,
            rgba: vec![0; 32 * 16 * 4],
        };
        assert!(matches!(fit_to_limit(&image, 32), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn oversized_textures_are_downscaled_before_upload() {
        let image = DecodedImage {
            width: 40,
            height: 80,
            rgba: vec![255; 40 * 80 * 4],
        };
        let fitted = fit_to_limit(&image, 20).unwrap();
        assert!(matches!(fitted, Cow::Owned(_)));
        assert_eq!((fitted.width, fitted.height), (10, 20));

        let broken = DecodedImage {
            width: 40,
            height: 80,
            rgba: Vec::new(),
        };
        assert!(fit_to_limit(&broken, 20).is_none());
    }

    #[test]
    fn vsync_selects_auto_modes() {
        assert_eq!(present_mode(true), wgpu::PresentMode::AutoVsync);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
