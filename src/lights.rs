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

use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Point3, Vector3};

use crate::primitives::color::Color;

/// Light hitting every surface equally, whatever its orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    #[must_use]
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

/// Light coming from infinitely far away, shining from `position` towards
/// the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Point3::new(0., 1., 0.),
        }
    }

    /// Unit vector from a lit surface towards the light.
    #[must_use]
    pub fn to_light(&self) -> Vector3<f32> {
        let offset = self.position - Point3::new(0., 0., 0.);
        if offset.magnitude2() > 0. {
            offset.normalize()
        } else {
            Vector3::unit_y()
        }
    }
}

fn scaled_linear(color: Color, intensity: f32) -> [f32; 4] {
    let [r, g, b] = color.to_linear();
    [r * intensity, g * intensity, b * intensity, 1.0]
}

/// Scene lights as laid out in the `Lights` WGSL struct. A light that is
/// absent contributes a black color.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient_color: [f32; 4],
    pub directional_color: [f32; 4],
    pub directional_to_light: [f32; 4],
}

crate::impl_uniform!(LightsUniform);

impl LightsUniform {
    #[must_use]
    pub fn new(ambient: Option<&AmbientLight>, directional: Option<&DirectionalLight>) -> Self {
        let mut lights = Self::default();
        if let Some(ambient) = ambient {
            lights.ambient_color = scaled_linear(ambient.color, ambient.intensity);
        }
        if let Some(directional) = directional {
            lights.directional_color = scaled_linear(directional.color, directional.intensity);
            lights.directional_to_light = directional.to_light().extend(0.).into();
        }
        lights
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn uniform_layout_is_three_vec4() {
        assert_eq!(std::mem::size_of::<LightsUniform>(), 48);
    }

    #[test]
    fn missing_lights_are_black() {
        let lights = LightsUniform::new(None, None);
        assert_eq!(lights.ambient_color, [0.; 4]);
        assert_eq!(lights.directional_color, [0.; 4]);
    }

    #[test]
    fn intensity_scales_linear_color() {
        let ambient = AmbientLight::new(Color::WHITE, 0.5);
        let lights = LightsUniform::new(Some(&ambient), None);
        assert_abs_diff_eq!(lights.ambient_color[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(lights.ambient_color[2], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn directional_light_points_from_origin_to_position() {
        let mut light = DirectionalLight::new(Color::WHITE, 1.0);
        light.position = Point3::new(5., 5., 5.);
        let lights = LightsUniform::new(None, Some(&light));
        let expected = 1.0 / 3f32.sqrt();
        for component in &lights.directional_to_light[..3] {
            assert_abs_diff_eq!(*component, expected, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(lights.directional_to_light[3], 0.0);
        assert_abs_diff_eq!(lights.directional_color[1], 1.0, epsilon = 1e-5);
    }
}
