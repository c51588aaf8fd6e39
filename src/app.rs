use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::DemoConfig,
    error::{Result, StagehandError},
    gfx::rendering::render_engine::RenderEngine,
    orchestrator::{FrameState, Orchestrator, ShutdownSignal},
    ui::{panel::material_debug_panel, UiManager},
    viewport::Viewport,
};

/// Window + event loop host for the demo
pub struct StagehandApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    orchestrator: Option<Orchestrator>,
    shutdown: ShutdownSignal,
    /// First fatal error; returned from `run` once the loop exits
    error: Option<StagehandError>,
}

impl StagehandApp {
    pub fn new(config: DemoConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                orchestrator: None,
                shutdown: ShutdownSignal::new(),
                error: None,
            },
        })
    }

    /// Signal that ends the run loop when triggered from anywhere
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.app_state.shutdown.clone()
    }

    /// Runs until the window closes, Escape is pressed or shutdown is signalled
    pub fn run(self) -> Result<()> {
        let StagehandApp {
            event_loop,
            mut app_state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut app_state)?;

        match app_state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.config.initial_size;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(self.config.window_title.clone())
                    .with_inner_size(LogicalSize::new(width, height)),
            )?,
        );

        let size = window.inner_size();
        let viewport = Viewport::from_physical(
            size.width,
            size.height,
            window.scale_factor(),
            self.config.max_pixel_ratio,
        );
        let (buffer_width, buffer_height) = viewport.drawing_buffer_size();

        let mut render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            buffer_width,
            buffer_height,
            self.config.vsync,
        ))?;

        let mut orchestrator = Orchestrator::setup(self.config.clone(), viewport);
        orchestrator.adopt_shutdown_signal(self.shutdown.clone());
        render_engine.init_scene(&mut orchestrator.scene);

        if orchestrator.debug_params().is_some() {
            let mut ui_manager = UiManager::new(
                render_engine.device(),
                render_engine.queue(),
                render_engine.surface_format(),
                &window,
            );
            ui_manager.update_display_size(buffer_width, buffer_height);
            self.ui_manager = Some(ui_manager);
        }

        log::info!(
            "Window {}x{} physical, drawing buffer {}x{}",
            size.width,
            size.height,
            buffer_width,
            buffer_height
        );

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.orchestrator = Some(orchestrator);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: StagehandError) {
        log::error!("{}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.shutdown.trigger();
        event_loop.exit();
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let buffer = self
            .orchestrator
            .as_mut()
            .and_then(|orchestrator| orchestrator.resize_physical(size.width, size.height, scale_factor));
        self.resize_targets(buffer);
    }

    /// Applies a DPI change once winit has given the window its new size
    fn settle_scale_factor(&mut self) {
        let (Some(window), Some(orchestrator)) = (self.window.as_ref(), self.orchestrator.as_mut())
        else {
            return;
        };
        let size = window.inner_size();
        let buffer = orchestrator.apply_pending_scale_factor(size.width, size.height);
        self.resize_targets(buffer);
    }

    fn resize_targets(&mut self, buffer: Option<(u32, u32)>) {
        let Some((width, height)) = buffer else {
            return;
        };
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(width, height);
        }
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.update_display_size(width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(orchestrator), Some(render_engine)) = (
            self.window.as_ref(),
            self.orchestrator.as_mut(),
            self.render_engine.as_mut(),
        ) else {
            return;
        };

        let elapsed = orchestrator.elapsed();
        if orchestrator.advance(elapsed) == FrameState::Stop {
            event_loop.exit();
            return;
        }

        for key in orchestrator.take_ready_textures() {
            if let Some(image) = orchestrator.textures().image(key) {
                render_engine.upload_texture(key, image);
            }
        }

        let params = orchestrator.debug_params().map(<[_]>::to_vec);
        let result = match (self.ui_manager.as_mut(), params) {
            (Some(ui_manager), Some(params)) => {
                let material = orchestrator.material().clone();
                let info = orchestrator.frame_info(elapsed);
                let window = window.clone();
                render_engine.render_frame(
                    &mut orchestrator.scene,
                    Some(|device: &wgpu::Device,
                          queue: &wgpu::Queue,
                          encoder: &mut wgpu::CommandEncoder,
                          view: &wgpu::TextureView| {
                        if let Err(err) = ui_manager.draw(device, queue, encoder, &window, view, |ui| {
                            material_debug_panel(ui, &material, &params, &info)
                        }) {
                            log::warn!("{}", err);
                        }
                    }),
                )
            }
            _ => render_engine.render_frame(
                &mut orchestrator.scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // UI gets first look at input; anything it captures stops here
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                if let Some(orchestrator) = self.orchestrator.as_mut() {
                    orchestrator.scene.camera_manager.controls.cancel_drag();
                }
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                log::info!("Shutdown requested");
                self.shutdown.trigger();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size, window.scale_factor());
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // The new inner size is only applied after this event returns
                if let Some(orchestrator) = self.orchestrator.as_mut() {
                    orchestrator.scale_factor_changed(scale_factor);
                }
                if let (Some(ui_manager), Some(render_engine)) =
                    (self.ui_manager.as_mut(), self.render_engine.as_ref())
                {
                    ui_manager.rebuild_fonts(render_engine.device(), render_engine.queue(), scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            other => {
                if let Some(orchestrator) = self.orchestrator.as_mut() {
                    let height = orchestrator.viewport.height;
                    orchestrator
                        .scene
                        .camera_manager
                        .process_window_event(&other, height);
                }
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self
            .ui_manager
            .as_ref()
            .is_some_and(|ui_manager| ui_manager.wants_input())
        {
            return;
        }

        if let Some(orchestrator) = self.orchestrator.as_mut() {
            let height = orchestrator.viewport.height;
            orchestrator
                .scene
                .camera_manager
                .process_device_event(&event, height);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown.is_triggered() {
            event_loop.exit();
            return;
        }
        self.settle_scale_factor();
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
