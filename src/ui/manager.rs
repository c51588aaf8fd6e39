// src/ui/manager.rs
//! ImGui overlay
//!
//! Glues imgui to winit input and the wgpu encoder the render engine hands
//! out each frame. The overlay draws on top of the scene without clearing it.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

use crate::error::{Result, StagehandError};

/// Base font size in logical pixels
const FONT_SIZE: f64 = 13.0;

/// Font size in physical pixels for a window scale factor
pub fn font_size_px(scale_factor: f64) -> f32 {
    let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    (FONT_SIZE * scale).round() as f32
}

fn install_font(context: &mut Context, scale_factor: f64) {
    let fonts = context.fonts();
    fonts.clear();
    fonts.add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            oversample_h: 1,
            pixel_snap_h: true,
            size_pixels: font_size_px(scale_factor),
            ..Default::default()
        }),
    }]);
}

/// Owns the imgui context, its winit platform and its wgpu renderer
///
/// DPI is locked to 1 so imgui works directly in drawing-buffer pixels; the
/// font is sized for the window's scale factor instead.
pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    pub fn new(device: &Device, queue: &Queue, output_format: TextureFormat, window: &Window) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));
        install_font(&mut context, window.scale_factor());

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: output_format,
                ..Default::default()
            },
        );

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Matches imgui's display size to the drawing buffer
    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Re-rasterises the font atlas after a DPI change
    pub fn rebuild_fonts(&mut self, device: &Device, queue: &Queue, scale_factor: f64) {
        install_font(&mut self.context, scale_factor);
        self.renderer
            .reload_font_texture(&mut self.context, device, queue);
        log::debug!("UI font rebuilt at {}px", font_size_px(scale_factor));
    }

    /// Whether imgui currently wants pointer or keyboard input for itself
    pub fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    /// Feeds an input event to imgui; returns true if the UI captured it
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        let Event::WindowEvent { event: window_event, .. } = event else {
            return false;
        };
        match window_event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Focused(_) => {
                self.platform
                    .handle_event(self.context.io_mut(), window, event);
                self.wants_input()
            }
            _ => false,
        }
    }

    /// Builds this frame's widgets with `run_ui` and draws them over `target`
    pub fn draw<F>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        target: &TextureView,
        run_ui: F,
    ) -> Result<()>
    where
        F: FnOnce(&imgui::Ui),
    {
        self.build_frame(window, run_ui)?;
        self.render_overlay(device, queue, encoder, target)
    }

    fn build_frame<F>(&mut self, window: &Window, run_ui: F) -> Result<()>
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform
            .prepare_frame(self.context.io_mut(), window)
            .map_err(|err| StagehandError::Ui(format!("prepare frame: {}", err)))?;

        let ui = self.context.frame();
        run_ui(ui);

        let cursor = ui.mouse_cursor();
        if self.last_cursor != cursor {
            self.last_cursor = cursor;
            self.platform.prepare_render(ui, window);
        }
        Ok(())
    }

    fn render_overlay(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
    ) -> Result<()> {
        let draw_data = self.context.render();
        let [width, height] = draw_data.display_size;
        if width <= 0.0 || height <= 0.0 {
            return Ok(());
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ui_overlay"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.renderer
            .render(draw_data, queue, device, &mut pass)
            .map_err(|err| StagehandError::Ui(format!("render: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_tracks_scale_factor() {
        assert_eq!(font_size_px(1.0), 13.0);
        assert_eq!(font_size_px(2.0), 26.0);
        assert_eq!(font_size_px(1.5), 20.0);
        assert_eq!(font_size_px(0.0), 13.0);
    }
}
