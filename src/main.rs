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

//! Scene, camera and renderer basics: two boxes in a rotating group, one
//! bouncing and followed by the camera, the other slowly spinning.

use std::cell::RefCell;
use std::f32::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

use cgmath::{EuclideanSpace, Point3};
use wgpu_first_steps::cameras::{Camera, PerspectiveConfig};
use wgpu_first_steps::controls::CameraControl;
use wgpu_first_steps::materials::BasicMaterial;
use wgpu_first_steps::plugins::PluginRegistry;
use wgpu_first_steps::plugins::scene_3d::{Scene3D, SceneElements};
use wgpu_first_steps::primitives::color::Color;
use wgpu_first_steps::primitives::geometry::box_geometry;
use wgpu_first_steps::primitives::mesh::{create_axes_helper, create_basic_mesh};
use wgpu_first_steps::primitives::{Group, Object3D, Shareable, Transform};
use wgpu_first_steps::{
    DrawContext, LaunchContext, RenderLoopHandler, TimeInfo, WindowOptions,
    launch_app_with_options,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const GROUP_ROTATION_PER_FRAME: f32 = 0.01;
const BOUNCE_AMPLITUDE: f32 = 0.1;
const SPIN_ACCELERATION: f32 = 0.001;

struct BasicTransforms {
    group: Rc<RefCell<Group>>,
    mesh1: Rc<RefCell<Object3D>>,
    mesh2: Rc<RefCell<Object3D>>,
}

impl BasicTransforms {
    fn new(
        LaunchContext {
            draw_context,
            plugin_registry,
        }: LaunchContext,
    ) -> anyhow::Result<Self> {
        let mut scene = Scene3D::new(draw_context);

        let group = Group::new().into_shareable();
        group.borrow_mut().transform.rotate_y(FRAC_PI_2);
        scene.add(group.clone());

        let mut mesh1 = create_basic_mesh(
            draw_context,
            scene.scene_uniforms(),
            &box_geometry(1., 1., 1.),
            &BasicMaterial::new(Color::from_hex(0x00ff00)),
        )?;
        mesh1.transform = Transform::from_position(1., 0., -2.);
        mesh1.transform.rotate_y(PI);
        let mesh1 = mesh1.into_shareable();
        group.borrow_mut().add(mesh1.clone());

        let mut mesh2 = create_basic_mesh(
            draw_context,
            scene.scene_uniforms(),
            &box_geometry(1., 2., 1.),
            &BasicMaterial::new(Color::parse("rgb(252, 126, 1)")?),
        )?;
        mesh2.transform = Transform::from_position(-1., 0., -2.);
        let mesh2 = mesh2.into_shareable();
        group.borrow_mut().add(mesh2.clone());

        let axes = create_axes_helper(draw_context, scene.scene_uniforms(), 3.)?;
        scene.add(axes.into_shareable());

        #[allow(clippy::cast_precision_loss)]
        let aspect = WIDTH as f32 / HEIGHT as f32;
        let mut camera = Camera::from(PerspectiveConfig::new(75., aspect, 1., 100.));
        camera.set_position(Point3::new(0., 0., 5.));
        plugin_registry.register(SceneElements::new(camera, CameraControl::Fixed, scene));
        Ok(Self {
            group,
            mesh1,
            mesh2,
        })
    }
}

impl RenderLoopHandler for BasicTransforms {
    fn on_update(
        &mut self,
        plugin_registry: &mut PluginRegistry,
        _draw_context: &mut DrawContext,
        time_info: &TimeInfo,
    ) {
        let elapsed = time_info.elapsed_seconds();
        self.group
            .borrow_mut()
            .transform
            .rotate_y(GROUP_ROTATION_PER_FRAME);
        self.mesh1
            .borrow_mut()
            .transform
            .translate_y((elapsed * PI).sin() * BOUNCE_AMPLITUDE);
        self.mesh2
            .borrow_mut()
            .transform
            .rotate_y(SPIN_ACCELERATION * elapsed);
        // Local position, the group rotation is not taken into account
        let target = Point3::from_vec(self.mesh1.borrow().transform.position);
        if let Some(scene_elements) = plugin_registry.get_mut::<SceneElements>() {
            scene_elements.camera.look_at(target);
        }
    }
}

fn main() -> anyhow::Result<()> {
    launch_app_with_options(
        WindowOptions::fixed("Basic transforms", WIDTH, HEIGHT),
        |context| Ok(Box::new(BasicTransforms::new(context)?)),
    )
}
