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

use std::sync::Arc;

use log::warn;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::{EventState, RenderContext, draw_context::DrawContext};

use super::Plugin;

/// GUI drawn over the scene. Without a window (headless runs) the context
/// still exists but nothing is drawn.
pub enum EguiPlugin {
    NoWindow(egui::Context),
    WithWindow(Box<EguiWithWindow>),
}

pub struct EguiWithWindow {
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    pixels_per_point: f32,
    window: Arc<Window>,
    frame_started: bool,
}

impl EguiPlugin {
    pub fn new(draw_context: &DrawContext) -> Self {
        let Some(window) = draw_context.window.as_ref() else {
            return Self::NoWindow(egui::Context::default());
        };
        let window = Arc::clone(window);
        let egui_state = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::default(),
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &draw_context.device,
            draw_context.surface_config.format,
            Some(DrawContext::DEPTH_FORMAT),
            draw_context.multisample_config.get_multisample_count(),
            true,
        );
        Self::WithWindow(Box::new(EguiWithWindow {
            egui_state,
            egui_renderer,
            #[allow(clippy::cast_possible_truncation)]
            pixels_per_point: window.scale_factor() as f32,
            window,
            frame_started: false,
        }))
    }

    #[must_use]
    pub fn egui_context(&self) -> &egui::Context {
        match self {
            Self::NoWindow(ctx) => ctx,
            Self::WithWindow(egui_support) => egui_support.egui_state.egui_ctx(),
        }
    }

    /// True while the GUI captures the pointer, e.g. when dragging a slider.
    #[must_use]
    pub fn is_using_pointer(&self) -> bool {
        self.egui_context().is_using_pointer()
    }

    /// Describes the GUI of the current frame. Must be called from the
    /// update step, before the plugin renders.
    pub fn draw<F>(&mut self, run_ui: F)
    where
        F: FnOnce(&egui::Context),
    {
        let Self::WithWindow(egui_support) = self else {
            return;
        };
        if egui_support.frame_started {
            warn!("GUI already drawn for this frame, ignoring");
            return;
        }
        let raw_input = egui_support
            .egui_state
            .take_egui_input(&egui_support.window);
        egui_support.egui_state.egui_ctx().begin_pass(raw_input);
        egui_support.frame_started = true;
        run_ui(egui_support.egui_state.egui_ctx());
    }
}

impl EguiWithWindow {
    fn end_frame_and_draw(
        &mut self,
        draw_context: &DrawContext,
        render_pass: &mut wgpu::RenderPass<'static>,
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                draw_context.surface_config.width,
                draw_context.surface_config.height,
            ],
            pixels_per_point: self.pixels_per_point,
        };
        let egui_ctx = self.egui_state.egui_ctx().clone();
        egui_ctx.set_pixels_per_point(screen_descriptor.pixels_per_point);
        let full_output = egui_ctx.end_pass();
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = egui_ctx.tessellate(full_output.shapes, egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(
                &draw_context.device,
                &draw_context.queue,
                *id,
                image_delta,
            );
        }
        let mut encoder =
            draw_context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Egui Encoder"),
                });
        let callback_buffers = self.egui_renderer.update_buffers(
            &draw_context.device,
            &draw_context.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        draw_context.queue.submit(
            callback_buffers
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        self.egui_renderer
            .render(render_pass, &tris, &screen_descriptor);
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

impl Plugin for EguiPlugin {
    fn on_window_event(&mut self, event: &WindowEvent) -> EventState {
        match self {
            Self::WithWindow(egui_support) => {
                if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        egui_support.pixels_per_point = *scale_factor as f32;
                    }
                }
                let event_response = egui_support
                    .egui_state
                    .on_window_event(&egui_support.window, event);
                EventState {
                    processed: event_response.consumed,
                }
            }
            Self::NoWindow(_) => EventState::default(),
        }
    }
    fn on_render(
        &mut self,
        render_context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'static>,
    ) {
        let Self::WithWindow(egui_support) = self else {
            return;
        };
        // Nothing to end if the lesson skipped the GUI this frame
        if !std::mem::take(&mut egui_support.frame_started) {
            return;
        }
        egui_support.end_frame_and_draw(render_context.draw_context, render_pass);
    }
}
