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

use std::f32::consts::FRAC_PI_2;

use cgmath::Point3;
use wgpu_first_steps::LaunchContext;
use wgpu_first_steps::RenderLoopHandler;
use wgpu_first_steps::cameras::{Camera, PerspectiveConfig};
use wgpu_first_steps::controls::{CameraControl, PointerOrbit};
use wgpu_first_steps::materials::BasicMaterial;
use wgpu_first_steps::plugins::scene_3d::{Scene3D, SceneElements};
use wgpu_first_steps::primitives::color::Color;
use wgpu_first_steps::primitives::geometry::box_geometry;
use wgpu_first_steps::primitives::mesh::{create_axes_helper, create_basic_mesh};
use wgpu_first_steps::primitives::{Group, Shareable};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;
const CAMERA_DISTANCE: f32 = 5.0;

/// Everything happens in the camera control, the scenario itself only
/// builds the scene.
pub struct MainScenario;

impl MainScenario {
    pub fn new(
        LaunchContext {
            draw_context,
            plugin_registry,
        }: LaunchContext,
    ) -> anyhow::Result<Self> {
        let mut scene = Scene3D::new(draw_context);
        let group = Group::new().into_shareable();
        group.borrow_mut().transform.rotate_y(FRAC_PI_2);
        scene.add(group.clone());

        let mesh = create_basic_mesh(
            draw_context,
            scene.scene_uniforms(),
            &box_geometry(1., 1., 1.),
            &BasicMaterial::new(Color::from_hex(0x00ff00)),
        )?;
        let mesh_position = Point3::new(0., 0., 0.) + mesh.transform.position;
        group.borrow_mut().add(mesh.into_shareable());
        scene.add(create_axes_helper(draw_context, scene.scene_uniforms(), 3.)?.into_shareable());

        #[allow(clippy::cast_precision_loss)]
        let aspect = WIDTH as f32 / HEIGHT as f32;
        let mut camera = Camera::from(PerspectiveConfig::new(75., aspect, 1., 100.));
        camera.set_position(Point3::new(0., 0., CAMERA_DISTANCE));
        let control = CameraControl::Pointer(PointerOrbit::new(CAMERA_DISTANCE, mesh_position));
        plugin_registry.register(SceneElements::new(camera, control, scene));
        Ok(Self)
    }
}

impl RenderLoopHandler for MainScenario {}
