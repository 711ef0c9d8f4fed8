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

use std::cell::RefCell;
use std::rc::Rc;

use cgmath::Point3;
use wgpu_first_steps::cameras::{Camera, PerspectiveConfig};
use wgpu_first_steps::controls::{CameraControl, OrbitControls};
use wgpu_first_steps::gui::MeshParams;
use wgpu_first_steps::materials::BasicMaterial;
use wgpu_first_steps::plugins::PluginRegistry;
use wgpu_first_steps::plugins::egui::EguiPlugin;
use wgpu_first_steps::plugins::scene_3d::{Scene3D, SceneElements};
use wgpu_first_steps::primitives::color::Color;
use wgpu_first_steps::primitives::geometry::box_geometry;
use wgpu_first_steps::primitives::mesh::{create_axes_helper, create_basic_mesh};
use wgpu_first_steps::primitives::{Object3D, Shareable};
use wgpu_first_steps::{DrawContext, LaunchContext, RenderLoopHandler, TimeInfo};

pub struct MainScenario {
    mesh: Rc<RefCell<Object3D>>,
    params: MeshParams,
}

impl MainScenario {
    pub fn new(
        LaunchContext {
            draw_context,
            plugin_registry,
        }: LaunchContext,
    ) -> anyhow::Result<Self> {
        let mut scene = Scene3D::new(draw_context);
        let mesh = create_basic_mesh(
            draw_context,
            scene.scene_uniforms(),
            &box_geometry(1., 1., 1.),
            &BasicMaterial::new(Color::from_hex(0x00ff00)),
        )?;
        let params = MeshParams::from_object(&mesh);
        let mesh = mesh.into_shareable();
        scene.add(mesh.clone());
        scene.add(create_axes_helper(draw_context, scene.scene_uniforms(), 3.)?.into_shareable());

        let aspect = draw_context.surface_ratio();
        let mut camera = Camera::from(PerspectiveConfig::new(75., aspect, 1., 100.));
        camera.set_position(Point3::new(0., 0., 5.));
        let control = CameraControl::Orbit(OrbitControls::with_damping());
        plugin_registry.register(SceneElements::new(camera, control, scene));
        // Registered last so that it sees pointer events before the camera
        plugin_registry.register(EguiPlugin::new(draw_context));
        Ok(Self { mesh, params })
    }
}

impl RenderLoopHandler for MainScenario {
    fn on_update(
        &mut self,
        plugin_registry: &mut PluginRegistry,
        _draw_context: &mut DrawContext,
        _time_info: &TimeInfo,
    ) {
        let Some(egui_plugin) = plugin_registry.get_mut::<EguiPlugin>() else {
            return;
        };
        let previous = self.params;
        egui_plugin.draw(|egui_context| self.params.show(egui_context));
        self.params.apply(&previous, &mut self.mesh.borrow_mut());
    }
}
