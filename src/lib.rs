// src/lib.rs
//! stagehand
//!
//! A small wgpu/winit scene demo: a sphere, a plane and a torus sharing one
//! material, spinning under a perspective camera with damped orbit controls.
//! The lit variant adds an ambient and a point light plus an ImGui panel that
//! edits the material live.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod gfx;
pub mod orchestrator;
pub mod ui;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::StagehandApp;
pub use config::{DemoConfig, SceneVariant};
pub use error::{Result, StagehandError};
pub use orchestrator::{FrameState, Orchestrator, ShutdownSignal};

/// Builds the app from environment configuration
pub fn from_env() -> Result<StagehandApp> {
    StagehandApp::new(DemoConfig::from_env())
}
