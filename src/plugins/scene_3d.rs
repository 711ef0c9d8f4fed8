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

use cgmath::{Matrix4, SquareMatrix, Zero};
use winit::event::WindowEvent;

use crate::{
    EventState,
    cameras::Camera,
    controls::CameraControl,
    draw_context::{DrawContext, Uniform},
    lights::{AmbientLight, DirectionalLight, LightsUniform},
    primitives::SceneNode,
    render_loop::{RenderContext, TimeInfo},
};

use super::Plugin;

#[allow(clippy::manual_non_exhaustive)]
pub struct Scene3DUniforms {
    pub camera_mat: Uniform<[[f32; 4]; 4]>,
    pub camera_pos: Uniform<[f32; 3]>,
    pub lights: Uniform<LightsUniform>,
    _private: (),
}

/// Root of the scene graph, rendered in insertion order.
pub struct Scene3D {
    nodes: Vec<SceneNode>,
    scene_uniforms: Scene3DUniforms,
}

impl Scene3D {
    pub fn new(context: &DrawContext) -> Self {
        Self {
            nodes: Vec::new(),
            scene_uniforms: Scene3DUniforms {
                camera_mat: Uniform::new(context, Matrix4::identity().into()),
                camera_pos: Uniform::new(context, cgmath::Vector3::zero().into()),
                lights: Uniform::new(context, LightsUniform::default()),
                _private: (),
            },
        }
    }
    #[must_use]
    pub fn scene_uniforms(&self) -> &Scene3DUniforms {
        &self.scene_uniforms
    }

    pub fn set_lights(
        &mut self,
        ambient: Option<&AmbientLight>,
        directional: Option<&DirectionalLight>,
    ) {
        self.scene_uniforms
            .lights
            .write_uniform(LightsUniform::new(ambient, directional));
    }

    pub fn add(&mut self, node: impl Into<SceneNode>) {
        self.nodes.push(node.into());
    }

    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Uploads camera matrices and the world matrix of every node.
    pub fn update(&mut self, camera: &Camera) {
        self.scene_uniforms
            .camera_mat
            .write_uniform(camera.get_camera_matrix().into());
        self.scene_uniforms
            .camera_pos
            .write_uniform(camera.eye_position().into());
        let root = Matrix4::identity();
        for node in &self.nodes {
            node.update_world_matrix(&root);
        }
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for node in &self.nodes {
            node.render(render_pass);
        }
    }
}

/// A scene with the camera looking at it and the way input moves that camera.
pub struct SceneElements {
    pub camera: Camera,
    pub control: CameraControl,
    pub scene: Scene3D,
}

impl SceneElements {
    #[must_use]
    pub fn new(camera: Camera, control: CameraControl, scene: Scene3D) -> Self {
        Self {
            camera,
            control,
            scene,
        }
    }
}

impl Plugin for SceneElements {
    fn on_window_event(&mut self, event: &WindowEvent) -> EventState {
        self.control.on_window_event(event)
    }
    fn on_resize(&mut self, draw_context: &DrawContext) {
        let dimensions = draw_context.surface_dimensions();
        self.camera.resize_screen(dimensions);
        self.control.set_screen_size(dimensions);
    }
    fn on_update(&mut self, _draw_context: &DrawContext, _time_info: &TimeInfo) {
        self.control.update(&mut self.camera);
    }
    fn on_render(
        &mut self,
        _render_context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'static>,
    ) {
        let Self { camera, scene, .. } = self;
        scene.update(camera);
        scene.render(render_pass);
    }
}
