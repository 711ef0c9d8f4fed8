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

use crate::primitives::color::Color;
use crate::textures::Texture;

/// Unlit material, same color whatever the lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMaterial {
    pub color: Color,
    pub wireframe: bool,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            wireframe: false,
        }
    }
}

impl BasicMaterial {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }
}

/// Lit material. Missing maps behave like a white texel for `map` and
/// `roughness_map`, and like an unperturbed normal for `normal_map`.
pub struct StandardMaterial {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub map: Option<Texture>,
    pub normal_map: Option<Texture>,
    pub roughness_map: Option<Texture>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            map: None,
            normal_map: None,
            roughness_map: None,
        }
    }
}

fn repeat_of(texture: Option<&Texture>) -> [f32; 4] {
    let [x, y] = texture.map_or([1., 1.], |t| t.repeat);
    [x, y, 0., 0.]
}

/// Matches the `Material` WGSL struct of the standard shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StandardMaterialUniform {
    pub map_repeat: [f32; 4],
    pub normal_map_repeat: [f32; 4],
    pub roughness_map_repeat: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    _padding: [f32; 2],
}

crate::impl_uniform!(StandardMaterialUniform);

impl From<&StandardMaterial> for StandardMaterialUniform {
    fn from(material: &StandardMaterial) -> Self {
        Self {
            map_repeat: repeat_of(material.map.as_ref()),
            normal_map_repeat: repeat_of(material.normal_map.as_ref()),
            roughness_map_repeat: repeat_of(material.roughness_map.as_ref()),
            roughness: material.roughness,
            metalness: material.metalness,
            _padding: [0.; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_uniform_is_padded_to_vec4() {
        assert_eq!(std::mem::size_of::<StandardMaterialUniform>(), 64);
    }

    #[test]
    fn untextured_material_uses_unit_repeat() {
        let uniform = StandardMaterialUniform::from(&StandardMaterial::default());
        assert_eq!(uniform.map_repeat, [1., 1., 0., 0.]);
        assert_eq!(uniform.roughness_map_repeat, [1., 1., 0., 0.]);
        assert!((uniform.roughness - 1.0).abs() < f32::EPSILON);
        assert!(uniform.metalness.abs() < f32::EPSILON);
    }

    #[test]
    fn basic_material_defaults_to_white_surface() {
        let material = BasicMaterial::default();
        assert_eq!(material.color, Color::WHITE);
        assert!(!material.wireframe);
        assert!(BasicMaterial::new(Color::from_hex(0x00ff00)).with_wireframe(true).wireframe);
    }
}
