//! Startup configuration
//!
//! [`DemoConfig`] collects every constant the scene is built from. Defaults
//! reproduce the reference scene; the binary can override the variant and
//! asset root through `STAGEHAND_VARIANT` and `STAGEHAND_ASSETS`.

use std::path::PathBuf;

use cgmath::Vector3;

/// Which of the two scene flavours to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneVariant {
    /// Normal-material shading, double sided, no lights, no debug panel
    Normal,
    /// Standard-material shading with ambient + point light and a debug panel
    Lit,
}

impl SceneVariant {
    /// Parses `normal` / `lit` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "lit" | "standard" => Some(Self::Lit),
            _ => None,
        }
    }

    pub fn has_lights(self) -> bool {
        matches!(self, Self::Lit)
    }

    pub fn has_debug_panel(self) -> bool {
        matches!(self, Self::Lit)
    }
}

/// Perspective camera parameters
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vector3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: Vector3::new(1.0, 1.0, 2.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub variant: SceneVariant,
    /// Directory the relative texture paths are resolved against
    pub asset_root: PathBuf,
    pub window_title: String,
    /// Initial window size in logical pixels
    pub initial_size: (u32, u32),
    pub camera: CameraConfig,
    /// Radians per second applied to every node's spin axis
    pub rotation_speed: f32,
    pub max_pixel_ratio: f64,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub vsync: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::Lit,
            asset_root: PathBuf::from("static"),
            window_title: "stagehand".to_string(),
            initial_size: (1280, 800),
            camera: CameraConfig::default(),
            rotation_speed: 0.3,
            max_pixel_ratio: 2.0,
            enable_damping: true,
            damping_factor: 0.05,
            vsync: true,
        }
    }
}

impl DemoConfig {
    /// Reads `STAGEHAND_VARIANT` and `STAGEHAND_ASSETS` on top of the defaults
    ///
    /// Unrecognised variant names are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("STAGEHAND_VARIANT") {
            match SceneVariant::parse(&value) {
                Some(variant) => config.variant = variant,
                None => log::warn!(
                    "Ignoring STAGEHAND_VARIANT={:?}; expected `normal` or `lit`",
                    value
                ),
            }
        }

        if let Ok(root) = std::env::var("STAGEHAND_ASSETS") {
            config.asset_root = PathBuf::from(root);
        }

        config
    }

    pub fn with_variant(mut self, variant: SceneVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_damping(mut self, enabled: bool) -> Self {
        self.enable_damping = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parsing() {
        assert_eq!(SceneVariant::parse("normal"), Some(SceneVariant::Normal));
        assert_eq!(SceneVariant::parse(" LIT "), Some(SceneVariant::Lit));
        assert_eq!(SceneVariant::parse("standard"), Some(SceneVariant::Lit));
        assert_eq!(SceneVariant::parse("matcap"), None);
    }

    #[test]
    fn defaults_match_reference_scene() {
        let config = DemoConfig::default();
        assert_eq!(config.camera.fov_y_degrees, 75.0);
        assert_eq!(config.camera.position, Vector3::new(1.0, 1.0, 2.0));
        assert_eq!(config.rotation_speed, 0.3);
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert!(config.enable_damping);
    }

    #[test]
    fn only_lit_variant_has_lights_and_panel() {
        assert!(SceneVariant::Lit.has_lights());
        assert!(SceneVariant::Lit.has_debug_panel());
        assert!(!SceneVariant::Normal.has_lights());
        assert!(!SceneVariant::Normal.has_debug_panel());
    }
}
