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

use cgmath::Point3;
use log::info;
use wgpu_first_steps::cameras::{Camera, PerspectiveConfig};
use wgpu_first_steps::controls::{CameraControl, OrbitControls};
use wgpu_first_steps::materials::BasicMaterial;
use wgpu_first_steps::plugins::scene_3d::{Scene3D, SceneElements};
use wgpu_first_steps::primitives::Shareable;
use wgpu_first_steps::primitives::color::Color;
use wgpu_first_steps::primitives::geometry::{
    Geometry, RANDOM_TRIANGLE_COUNT, RANDOM_TRIANGLE_SPREAD, random_triangles,
};
use wgpu_first_steps::primitives::mesh::create_basic_mesh;
use wgpu_first_steps::{LaunchContext, RenderLoopHandler};

pub struct MainScenario;

impl MainScenario {
    pub fn new(
        LaunchContext {
            draw_context,
            plugin_registry,
        }: LaunchContext,
    ) -> anyhow::Result<Self> {
        let mut scene = Scene3D::new(draw_context);
        // 3 values per vertex, 3 vertices per triangle
        let buffer = random_triangles(
            RANDOM_TRIANGLE_COUNT,
            RANDOM_TRIANGLE_SPREAD,
            &mut rand::thread_rng(),
        );
        let geometry = Geometry::from_flat_positions(&buffer)?;
        info!(
            "Generated {} triangles from {} values",
            geometry.triangle_count(),
            buffer.len()
        );
        let mesh = create_basic_mesh(
            draw_context,
            scene.scene_uniforms(),
            &geometry,
            &BasicMaterial::new(Color::from_hex(0x00ff00)).with_wireframe(true),
        )?;
        scene.add(mesh.into_shareable());

        let aspect = draw_context.surface_ratio();
        let mut camera = Camera::from(PerspectiveConfig::new(75., aspect, 1., 1000.));
        camera.set_position(Point3::new(0., 0., 5.));
        let control = CameraControl::Orbit(OrbitControls::with_damping());
        plugin_registry.register(SceneElements::new(camera, control, scene));
        Ok(Self)
    }
}

impl RenderLoopHandler for MainScenario {}
