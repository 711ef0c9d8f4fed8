/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::ops::RangeInclusive;

use log::info;

use crate::primitives::{Object3D, color::Color};

/// Values the GUI panel edits on a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    pub x_pos: f32,
    pub y_pos: f32,
    pub color: Color,
    pub wireframe: bool,
}

impl MeshParams {
    pub const X_RANGE: RangeInclusive<f32> = -10.0..=10.0;
    pub const Y_RANGE: RangeInclusive<f32> = -10.0..=10.0;
    pub const Y_STEP: f32 = 1.0;

    #[must_use]
    pub fn from_object(object: &Object3D) -> Self {
        let position = object.transform.position;
        Self {
            x_pos: position.x,
            y_pos: position.y,
            color: object.color().unwrap_or(Color::WHITE),
            wireframe: object.is_wireframe(),
        }
    }

    pub fn set_x_pos(&mut self, value: f32) {
        self.x_pos = value.clamp(*Self::X_RANGE.start(), *Self::X_RANGE.end());
    }

    /// Snaps to the closest step inside the range.
    pub fn set_y_pos(&mut self, value: f32) {
        let snapped = (value / Self::Y_STEP).round() * Self::Y_STEP;
        self.y_pos = snapped.clamp(*Self::Y_RANGE.start(), *Self::Y_RANGE.end());
    }

    /// Pushes every value that differs from `previous` to `object`.
    pub fn apply(&self, previous: &Self, object: &mut Object3D) {
        if self.x_pos != previous.x_pos || self.y_pos != previous.y_pos {
            object.transform.position.x = self.x_pos;
            object.transform.position.y = self.y_pos;
        }
        if self.color != previous.color {
            info!("Color changed to {}", self.color.to_hex_string());
            object.set_color(self.color);
        }
        if self.wireframe != previous.wireframe {
            object.set_wireframe(self.wireframe);
        }
    }

    /// Panel with one control per value.
    #[cfg(feature = "egui")]
    pub fn show(&mut self, egui_context: &egui::Context) {
        egui::Window::new("Parameters").show(egui_context, |ui| {
            let mut x_pos = self.x_pos;
            ui.add(egui::Slider::new(&mut x_pos, Self::X_RANGE).text("x pos"));
            self.set_x_pos(x_pos);
            let mut y_pos = self.y_pos;
            ui.add(
                egui::Slider::new(&mut y_pos, Self::Y_RANGE)
                    .step_by(f64::from(Self::Y_STEP))
                    .text("y pos"),
            );
            self.set_y_pos(y_pos);
            ui.horizontal(|ui| {
                let mut rgb = self.color.to_rgb8();
                ui.color_edit_button_srgb(&mut rgb);
                self.color = Color::from_rgb8(rgb);
                ui.label("color");
            });
            ui.checkbox(&mut self.wireframe, "wireframe");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> MeshParams {
        MeshParams {
            x_pos: 0.,
            y_pos: 0.,
            color: Color::from_hex(0x00ff00),
            wireframe: false,
        }
    }

    #[test]
    fn x_pos_is_clamped() {
        let mut params = params();
        params.set_x_pos(12.5);
        assert!((params.x_pos - 10.0).abs() < f32::EPSILON);
        params.set_x_pos(-3.25);
        assert!((params.x_pos + 3.25).abs() < f32::EPSILON);
    }

    #[test]
    fn y_pos_snaps_to_step() {
        let mut params = params();
        params.set_y_pos(2.4);
        assert!((params.y_pos - 2.0).abs() < f32::EPSILON);
        params.set_y_pos(-2.6);
        assert!((params.y_pos + 3.0).abs() < f32::EPSILON);
        params.set_y_pos(-42.0);
        assert!((params.y_pos + 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn color_round_trips_through_picker_bytes() {
        let params = params();
        assert_eq!(Color::from_rgb8(params.color.to_rgb8()), params.color);
        assert_eq!(params.color.to_hex_string(), "00ff00");
    }

    #[test]
    fn apply_pushes_only_changed_values() {
        use crate::draw_context::headless_test_context;
        use crate::materials::BasicMaterial;
        use crate::plugins::scene_3d::Scene3D;
        use crate::primitives::{geometry::box_geometry, mesh::create_basic_mesh};

        let Some(context) = headless_test_context() else {
            return;
        };
        let scene = Scene3D::new(&context);
        let material = BasicMaterial::new(Color::from_hex(0x00ff00));
        let mut mesh = create_basic_mesh(
            &context,
            scene.scene_uniforms(),
            &box_geometry(1., 1., 1.),
            &material,
        )
        .expect("box mesh");
        let previous = MeshParams::from_object(&mesh);
        assert_eq!(previous, params());

        let mut edited = previous;
        edited.set_x_pos(2.5);
        edited.set_y_pos(-4.2);
        edited.apply(&previous, &mut mesh);
        assert!((mesh.transform.position.x - 2.5).abs() < f32::EPSILON);
        assert!((mesh.transform.position.y + 4.0).abs() < f32::EPSILON);
        assert_eq!(mesh.color(), Some(Color::from_hex(0x00ff00)));
        assert!(!mesh.is_wireframe());

        let previous = edited;
        edited.color = Color::from_hex(0xff0000);
        edited.wireframe = true;
        edited.apply(&previous, &mut mesh);
        assert_eq!(mesh.color(), Some(Color::from_hex(0xff0000)));
        assert!(mesh.is_wireframe());
        assert_eq!(MeshParams::from_object(&mesh), edited);
    }
}
