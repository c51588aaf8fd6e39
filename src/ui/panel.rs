// src/ui/panel.rs
//! Material debug panel
//!
//! Live numeric controls bound to fields of the shared material, plus a
//! read-only frame readout.

use crate::gfx::resources::{
    material::{MaterialField, SharedMaterial},
    texture_loader::TextureKey,
    LoadStatus,
};

/// One range-constrained control bound to a material field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugParam {
    pub field: MaterialField,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl DebugParam {
    /// Clamps `value` to [min, max] and snaps it to the step grid
    pub fn constrain(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    /// Writes a constrained value into the material; returns what was stored
    pub fn apply(&self, material: &SharedMaterial, value: f32) -> f32 {
        let value = self.constrain(value);
        material.borrow_mut().set_field(self.field, value);
        value
    }

    pub fn read(&self, material: &SharedMaterial) -> f32 {
        material.borrow().field(self.field)
    }
}

/// The lit scene's controls: metalness, roughness and AO intensity
pub fn debug_params() -> [DebugParam; 3] {
    [
        DebugParam {
            field: MaterialField::Metalness,
            label: "metalness",
            min: 0.0,
            max: 1.0,
            step: 0.0001,
        },
        DebugParam {
            field: MaterialField::Roughness,
            label: "roughness",
            min: 0.0,
            max: 1.0,
            step: 0.0001,
        },
        DebugParam {
            field: MaterialField::AoMapIntensity,
            label: "aoMapIntensity",
            min: 0.0,
            max: 10.0,
            step: 0.001,
        },
    ]
}

/// Read-only state shown under the controls
#[derive(Debug, Clone, Default)]
pub struct FrameInfo {
    pub elapsed: f32,
    pub viewport: (f64, f64),
    pub pixel_ratio: f64,
    pub textures: Vec<(TextureKey, LoadStatus)>,
}

/// Draws the debug panel; edits go straight into the shared material
pub fn material_debug_panel(
    ui: &imgui::Ui,
    material: &SharedMaterial,
    params: &[DebugParam],
    info: &FrameInfo,
) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Debug")
        .size([300.0, 0.0], imgui::Condition::FirstUseEver)
        .position(
            [display_size[0] - 320.0, 20.0],
            imgui::Condition::FirstUseEver,
        )
        .collapsible(true)
        .build(|| {
            for param in params {
                let mut value = param.read(material);
                let changed = imgui::Drag::new(param.label)
                    .range(param.min, param.max)
                    .speed(param.step)
                    .display_format("%.4f")
                    .build(ui, &mut value);
                if changed {
                    param.apply(material, value);
                }
            }

            ui.separator();
            ui.text(format!("elapsed: {:.2}s", info.elapsed));
            ui.text(format!(
                "viewport: {:.0}x{:.0} @{:.2}x",
                info.viewport.0, info.viewport.1, info.pixel_ratio
            ));
            if ui.collapsing_header("Textures", imgui::TreeNodeFlags::empty()) {
                for (key, status) in &info.textures {
                    ui.text(format!("{}: {:?}", key, status));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::Material;
    use std::rc::Rc;

    #[test]
    fn params_cover_each_field_once() {
        let params = debug_params();
        for field in MaterialField::ALL {
            assert_eq!(params.iter().filter(|p| p.field == field).count(), 1);
        }
        assert_eq!(params[2].max, 10.0);
    }

    #[test]
    fn labels_resolve_to_their_fields() {
        for param in debug_params() {
            assert_eq!(MaterialField::from_name(param.label).unwrap(), param.field);
        }
    }

    #[test]
    fn constrain_clamps_and_snaps() {
        let roughness = debug_params()[1];
        assert_eq!(roughness.constrain(1.7), 1.0);
        assert_eq!(roughness.constrain(-0.3), 0.0);
        assert!((roughness.constrain(0.123_456) - 0.1235).abs() < 1e-6);
        assert_eq!(roughness.constrain(f32::NAN), 0.0);

        let ao = debug_params()[2];
        assert!((ao.constrain(2.000_4) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn apply_reaches_every_holder_of_the_material() {
        let material = Material::standard("shared", 0.45, 0.65).into_shared();
        let other_holder = Rc::clone(&material);

        let stored = debug_params()[0].apply(&material, 0.8);
        assert!((stored - 0.8).abs() < 1e-6);
        assert!((other_holder.borrow().metalness - 0.8).abs() < 1e-6);
    }
}
