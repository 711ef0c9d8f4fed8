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

use cgmath::{InnerSpace, Matrix4, PerspectiveFov, Point3, Rad, Vector3, vec3};
use std::sync::LazyLock;

use crate::Dimensions;

static TO_WEBGPU_NDCS: LazyLock<Matrix4<f32>> = LazyLock::new(|| {
    Matrix4::from_translation(vec3(0., 0., 0.5)) * Matrix4::from_nonuniform_scale(1., 1., 0.5)
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
}

impl CameraView {
    /// Right-handed view: the camera looks down its local -Z axis.
    #[must_use]
    pub fn calc_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.center, self.up)
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 5.0),
            center: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
        }
    }
}

pub trait CameraProjection {
    fn calc_projection(&self) -> Matrix4<f32>;
    fn resize_screen(&mut self, dimensions: Dimensions);
}

/// Perspective frustum, with the field of view in degrees as is customary
/// for tutorial code. Anything closer than `near` or farther than `far` is
/// clipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveConfig {
    pub fovy_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveConfig {
    #[must_use]
    pub fn new(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fovy_deg,
            aspect,
            near,
            far,
        }
    }
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self {
            fovy_deg: 50.0,
            aspect: 1.0,
            near: 0.1,
            far: 2_000.0,
        }
    }
}

impl CameraProjection for PerspectiveConfig {
    fn calc_projection(&self) -> Matrix4<f32> {
        Matrix4::from(PerspectiveFov {
            fovy: Rad(self.fovy_deg.to_radians()),
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        })
    }
    fn resize_screen(&mut self, dimensions: Dimensions) {
        if !dimensions.is_empty() {
            self.aspect = dimensions.surface_ratio();
        }
    }
}

pub struct Camera {
    projection: Box<dyn CameraProjection>,
    view: CameraView,
    projection_cache: Matrix4<f32>,
    view_cache: Matrix4<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            CameraView::default(),
            Box::new(PerspectiveConfig::default()),
        )
    }
}

impl From<PerspectiveConfig> for Camera {
    fn from(config: PerspectiveConfig) -> Self {
        Self::new(CameraView::default(), Box::new(config))
    }
}

impl Camera {
    #[must_use]
    pub fn new(view: CameraView, projection: Box<dyn CameraProjection>) -> Self {
        let view_cache = view.calc_view_matrix();
        let projection_cache = projection.calc_projection();
        Self {
            projection,
            view,
            projection_cache,
            view_cache,
        }
    }
    fn update_view_cache(&mut self) {
        self.view_cache = self.view.calc_view_matrix();
    }
    fn update_projection_cache(&mut self) {
        self.projection_cache = self.projection.calc_projection();
    }
    pub fn resize_screen(&mut self, dimensions: Dimensions) {
        self.projection.resize_screen(dimensions);
        self.update_projection_cache();
    }
    /// Projection and view combined, mapped to the wgpu clip space (z in `[0, 1]`).
    #[must_use]
    pub fn get_camera_matrix(&self) -> Matrix4<f32> {
        (*TO_WEBGPU_NDCS) * self.projection_cache * self.view_cache
    }
    #[must_use]
    pub fn view(&self) -> &CameraView {
        &self.view
    }
    #[must_use]
    pub fn eye_position(&self) -> Point3<f32> {
        self.view.eye
    }
    #[must_use]
    pub fn target(&self) -> Point3<f32> {
        self.view.center
    }
    pub fn set_position(&mut self, eye: Point3<f32>) {
        self.view.eye = eye;
        self.update_view_cache();
    }
    pub fn look_at(&mut self, center: Point3<f32>) {
        self.view.center = center;
        self.update_view_cache();
    }
    pub fn set_view(&mut self, view: CameraView) {
        self.view = view;
        self.update_view_cache();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use cgmath::Vector4;

    use super::*;

    fn lesson_camera() -> Camera {
        PerspectiveConfig::new(75.0, 800. / 600., 1.0, 100.0).into()
    }

    fn to_ndc(camera: &Camera, point: Point3<f32>) -> Vector4<f32> {
        let clip = camera.get_camera_matrix() * point.to_homogeneous();
        clip / clip.w
    }

    #[test]
    fn origin_is_at_screen_center() {
        let camera = lesson_camera();
        let ndc = to_ndc(&camera, Point3::new(0., 0., 0.));
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn near_and_far_planes_map_to_wgpu_depth_range() {
        let camera = lesson_camera();
        // Camera sits at z=5 looking at the origin
        let near = to_ndc(&camera, Point3::new(0., 0., 4.));
        let far = to_ndc(&camera, Point3::new(0., 0., -95.));
        assert_abs_diff_eq!(near.z, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn positive_x_is_on_the_right() {
        let camera = lesson_camera();
        let ndc = to_ndc(&camera, Point3::new(1., 1., 0.));
        assert!(ndc.x > 0.0);
        assert!(ndc.y > 0.0);
    }

    #[test]
    fn resize_updates_aspect_only_for_non_empty_surfaces() {
        let mut config = PerspectiveConfig::new(75.0, 1.0, 1.0, 100.0);
        config.resize_screen(Dimensions {
            width: 1920,
            height: 1080,
        });
        assert_abs_diff_eq!(config.aspect, 16.0 / 9.0, epsilon = 1e-6);
        config.resize_screen(Dimensions {
            width: 1920,
            height: 0,
        });
        assert_abs_diff_eq!(config.aspect, 16.0 / 9.0, epsilon = 1e-6);
    }

    #[test]
    fn look_at_changes_view_direction() {
        let mut camera = lesson_camera();
        camera.look_at(Point3::new(1., 0., -2.));
        let ndc = to_ndc(&camera, Point3::new(1., 0., -2.));
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.target(), Point3::new(1., 0., -2.));
        assert_abs_diff_eq!(
            (camera.target() - camera.eye_position()).normalize().z,
            -7.0 / 50.0_f32.sqrt(),
            epsilon = 1e-5
        );
    }
}
