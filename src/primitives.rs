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

pub mod color;
pub mod geometry;
pub mod mesh;

use std::cell::RefCell;
use std::rc::Rc;

use cgmath::{Matrix, Matrix3, Matrix4, Quaternion, Rad, SquareMatrix, Vector3};
use cgmath::{One, Rotation3};

use crate::draw_context::{Drawable, Uniform};
use color::Color;

/// Inverse transpose of the upper-left 3x3, so that normals stay
/// perpendicular to surfaces under non-uniform scaling. Not normalised.
fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    linear
        .invert()
        .map_or_else(Matrix3::identity, |inverted| inverted.transpose())
}

pub trait Shareable: Sized {
    fn into_shareable(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

/// Local placement of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0., 0., 0.),
            rotation: Quaternion::one(),
            scale: Vector3::new(1., 1., 1.),
        }
    }
}

impl Transform {
    #[must_use]
    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::default()
        }
    }
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
    }
    /// Rotates around the local Y axis, on top of the current rotation.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = self.rotation * Quaternion::from_angle_y(Rad(angle));
    }
    /// Moves along the local Y axis, i.e. the Y axis once rotated.
    pub fn translate_y(&mut self, distance: f32) {
        self.position += self.rotation * Vector3::unit_y() * distance;
    }
    #[must_use]
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

pub struct Object3DUniforms {
    pub model: Uniform<[[f32; 4]; 4]>,
    pub normals: Option<Uniform<[[f32; 3]; 3]>>,
    pub color: Option<Uniform<[f32; 4]>>,
}

/// A renderable object: a surface and/or wireframe drawable sharing the same
/// vertices, placed by its local [`Transform`].
pub struct Object3D {
    surface: Option<Drawable>,
    wireframe: Option<Drawable>,
    show_wireframe: bool,
    color: Option<Color>,
    uniforms: Object3DUniforms,
    world_matrix: Matrix4<f32>,
    pub transform: Transform,
}

impl Object3D {
    #[must_use]
    pub fn new(
        surface: Option<Drawable>,
        wireframe: Option<Drawable>,
        uniforms: Object3DUniforms,
    ) -> Self {
        let show_wireframe = surface.is_none();
        Self {
            surface,
            wireframe,
            show_wireframe,
            color: None,
            uniforms,
            world_matrix: Matrix4::identity(),
            transform: Transform::default(),
        }
    }
    pub(crate) fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.color
    }
    /// No-op on objects created without a color uniform.
    pub fn set_color(&mut self, color: Color) {
        if let Some(uniform) = &mut self.uniforms.color {
            uniform.write_uniform(color.to_linear_rgba());
            self.color = Some(color);
        }
    }
    #[must_use]
    pub fn is_wireframe(&self) -> bool {
        self.show_wireframe
    }
    /// Switches between surface and wireframe rendering when both exist.
    pub fn set_wireframe(&mut self, enabled: bool) {
        let available = if enabled {
            self.wireframe.is_some()
        } else {
            self.surface.is_some()
        };
        if available {
            self.show_wireframe = enabled;
        } else {
            log::warn!("Object has no drawable for wireframe={enabled}");
        }
    }
    /// Placement in the scene as of the last [`Self::update_world_matrix`].
    #[must_use]
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world_matrix
    }
    pub fn update_world_matrix(&mut self, parent: &Matrix4<f32>) {
        self.world_matrix = *parent * self.transform.matrix();
        self.uniforms.model.write_uniform(self.world_matrix.into());
        if let Some(normals) = &mut self.uniforms.normals {
            normals.write_uniform(normal_matrix(&self.world_matrix).into());
        }
    }
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let drawable = if self.show_wireframe {
            self.wireframe.as_ref()
        } else {
            self.surface.as_ref()
        };
        if let Some(drawable) = drawable {
            drawable.render(render_pass);
        }
    }
}

impl Shareable for Object3D {}

/// Parent of other nodes; its transform applies to all children.
#[derive(Default)]
pub struct Group {
    pub transform: Transform,
    children: Vec<SceneNode>,
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add(&mut self, node: impl Into<SceneNode>) {
        self.children.push(node.into());
    }
    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }
}

impl Shareable for Group {}

#[derive(Clone)]
pub enum SceneNode {
    Object(Rc<RefCell<Object3D>>),
    Group(Rc<RefCell<Group>>),
}

impl SceneNode {
    pub fn update_world_matrix(&self, parent: &Matrix4<f32>) {
        match self {
            Self::Object(object) => object.borrow_mut().update_world_matrix(parent),
            Self::Group(group) => {
                let group = group.borrow();
                let world = *parent * group.transform.matrix();
                for child in &group.children {
                    child.update_world_matrix(&world);
                }
            }
        }
    }
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        match self {
            Self::Object(object) => object.borrow().render(render_pass),
            Self::Group(group) => {
                for child in &group.borrow().children {
                    child.render(render_pass);
                }
            }
        }
    }
}

impl From<Rc<RefCell<Object3D>>> for SceneNode {
    fn from(object: Rc<RefCell<Object3D>>) -> Self {
        Self::Object(object)
    }
}

impl From<Rc<RefCell<Group>>> for SceneNode {
    fn from(group: Rc<RefCell<Group>>) -> Self {
        Self::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use cgmath::{InnerSpace, Point3, Transform as _};
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn default_transform_is_identity() {
        assert_abs_diff_eq!(Transform::default().matrix(), Matrix4::identity());
    }

    #[test]
    fn rotate_y_accumulates() {
        let mut transform = Transform::default();
        transform.rotate_y(FRAC_PI_2);
        transform.rotate_y(FRAC_PI_2);
        let rotated = transform.matrix().transform_point(Point3::new(1., 0., 0.));
        assert_abs_diff_eq!(rotated, Point3::new(-1., 0., 0.), epsilon = 1e-5);
    }

    #[test]
    fn translate_y_follows_local_axis() {
        let mut transform = Transform::from_position(1., 0., -2.);
        transform.rotate_y(PI);
        transform.translate_y(0.5);
        assert_abs_diff_eq!(transform.position, Vector3::new(1., 0.5, -2.), epsilon = 1e-5);

        let mut tilted = Transform::default();
        tilted.rotation = Quaternion::from_angle_z(Rad(FRAC_PI_2));
        tilted.translate_y(1.0);
        assert_abs_diff_eq!(tilted.position, Vector3::new(-1., 0., 0.), epsilon = 1e-5);
    }

    #[test]
    fn group_rotation_applies_to_children_positions() {
        let mut group = Transform::default();
        group.rotate_y(FRAC_PI_2);
        let child = Transform::from_position(1., 0., -2.);
        let world = group.matrix() * child.matrix();
        let origin = world.transform_point(Point3::new(0., 0., 0.));
        // A quarter turn around Y maps (1, 0, -2) to (-2, 0, -1)
        assert_abs_diff_eq!(origin, Point3::new(-2., 0., -1.), epsilon = 1e-5);
    }

    #[test]
    fn normal_matrix_of_rotation_is_the_rotation() {
        let mut transform = Transform::default();
        transform.rotate_y(0.3);
        let expected = Matrix3::from(Quaternion::from_angle_y(Rad(0.3)));
        assert_abs_diff_eq!(normal_matrix(&transform.matrix()), expected, epsilon = 1e-5);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_scaling() {
        let mut transform = Transform::default();
        transform.scale = Vector3::new(2., 1., 1.);
        transform.rotate_y(0.7);
        let world = transform.matrix();
        // Slanted face of a unit box corner: tangent (1, -1, 0), normal (1, 1, 0)
        let tangent = (world * Vector3::new(1., -1., 0.).extend(0.)).truncate();
        let normal = normal_matrix(&world) * Vector3::new(1., 1., 0.);
        assert_abs_diff_eq!(tangent.dot(normal), 0.0, epsilon = 1e-5);
        let scaled_only = normal_matrix(&Matrix4::from_nonuniform_scale(2., 1., 1.));
        assert_abs_diff_eq!(scaled_only.x.x, 0.5, epsilon = 1e-6);
    }
}
