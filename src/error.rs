//! Error types for the stagehand demo
//!
//! Every boundary that touches an external resource (window, GPU surface,
//! adapter, device, texture files) reports through [`StagehandError`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up or driving the scene
#[derive(Debug, Error)]
pub enum StagehandError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to bind drawing surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("failed to load texture {path}: {source}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture load for {0} was abandoned before completing")]
    TextureCanceled(PathBuf),

    #[error("material has no field named `{0}`")]
    UnknownMaterialField(String),

    #[error("debug panel failed: {0}")]
    Ui(String),
}

pub type Result<T> = std::result::Result<T, StagehandError>;
