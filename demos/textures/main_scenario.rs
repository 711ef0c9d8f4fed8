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
use wgpu_first_steps::cameras::{Camera, PerspectiveConfig};
use wgpu_first_steps::controls::{CameraControl, OrbitControls};
use wgpu_first_steps::lights::{AmbientLight, DirectionalLight};
use wgpu_first_steps::materials::StandardMaterial;
use wgpu_first_steps::plugins::scene_3d::{Scene3D, SceneElements};
use wgpu_first_steps::primitives::Shareable;
use wgpu_first_steps::primitives::color::Color;
use wgpu_first_steps::primitives::geometry::sphere_geometry;
use wgpu_first_steps::primitives::mesh::{create_axes_helper, create_standard_mesh};
use wgpu_first_steps::textures::{Filter, TextureLoader, TextureOptions};
use wgpu_first_steps::{LaunchContext, RenderLoopHandler};

const COLOR_MAP: &str = "Wood048_1K-JPG/Wood048_1K-JPG_Color.jpg";
const NORMAL_MAP: &str = "Wood048_1K-JPG/Wood048_1K-JPG_NormalGL.jpg";
const ROUGHNESS_MAP: &str = "Wood048_1K-JPG/Wood048_1K-JPG_Roughness.jpg";

pub struct MainScenario;

impl MainScenario {
    pub fn new(
        LaunchContext {
            draw_context,
            plugin_registry,
        }: LaunchContext,
    ) -> anyhow::Result<Self> {
        let loader = TextureLoader::from_env();
        // Mipmaps would never be sampled with a plain linear min filter
        let color_options = TextureOptions {
            min_filter: Filter::Linear,
            generate_mipmaps: false,
            ..TextureOptions::default().with_repeat(5., 5.)
        };
        let material = StandardMaterial {
            map: Some(loader.load(draw_context, COLOR_MAP, &color_options)),
            normal_map: Some(loader.load(draw_context, NORMAL_MAP, &TextureOptions::normal_map())),
            roughness_map: Some(loader.load(
                draw_context,
                ROUGHNESS_MAP,
                &TextureOptions::data_map(),
            )),
            ..StandardMaterial::default()
        };

        let mut scene = Scene3D::new(draw_context);
        let sphere = create_standard_mesh(
            draw_context,
            scene.scene_uniforms(),
            &sphere_geometry(1., 32, 32),
            &material,
        )?;
        scene.add(sphere.into_shareable());

        let ambient_light = AmbientLight::new(Color::from_hex(0xffffff), 0.5);
        let mut directional_light = DirectionalLight::new(Color::from_hex(0xffffff), 1.);
        directional_light.position = Point3::new(5., 5., 5.);
        scene.set_lights(Some(&ambient_light), Some(&directional_light));
        scene.add(create_axes_helper(draw_context, scene.scene_uniforms(), 3.)?.into_shareable());

        let aspect = draw_context.surface_ratio();
        let mut camera = Camera::from(PerspectiveConfig::new(75., aspect, 1., 100.));
        camera.set_position(Point3::new(0., 0., 5.));
        let control = CameraControl::Orbit(OrbitControls::with_damping());
        plugin_registry.register(SceneElements::new(camera, control, scene));
        Ok(Self)
    }
}

impl RenderLoopHandler for MainScenario {}
