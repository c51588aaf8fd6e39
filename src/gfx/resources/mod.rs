// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! The shared material, background texture loading, texture upload and the
//! global uniforms.

pub mod global_bindings;
pub mod material;
pub mod texture_loader;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightingState};
pub use material::{Material, MaterialField, MaterialKind, SharedMaterial, Side, TextureSlot};
pub use texture_loader::{LoadStatus, TextureHandle, TextureKey, TextureLibrary};
pub use texture_resource::{TextureCache, TextureResource};
