//! # User Interface Module
//!
//! Dear ImGui overlay: [`UiManager`] handles the winit/wgpu integration and
//! input capture, [`panel`] holds the material debug panel.
//!
//! While the UI wants the pointer, camera controls ignore input.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{debug_params, material_debug_panel, DebugParam, FrameInfo};
