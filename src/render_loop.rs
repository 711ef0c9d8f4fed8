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

use log::{debug, info};
use web_time::{Duration, Instant};
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};

use crate::{draw_context::DrawContext, plugins::PluginRegistry};

pub struct TimeInfo {
    pub init_start: Instant,
    pub processing_delta: Duration,
}

impl TimeInfo {
    /// Seconds since the lesson started, the usual driver of animations.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.init_start.elapsed().as_secs_f32()
    }
}

impl Default for TimeInfo {
    fn default() -> Self {
        Self {
            init_start: Instant::now(),
            processing_delta: Duration::new(0, 0),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventState {
    pub processed: bool,
}

#[allow(clippy::manual_non_exhaustive)]
pub struct RenderContext<'a> {
    pub time_info: &'a TimeInfo,
    pub draw_context: &'a DrawContext,
    pub(crate) _private: (),
}

pub struct LaunchContext<'a> {
    pub draw_context: &'a mut DrawContext,
    pub plugin_registry: &'a mut PluginRegistry,
}

pub trait RenderLoopHandler {
    fn on_mouse_event(&mut self, _event: &DeviceEvent) {}
    fn on_keyboard_event(&mut self, _event: &KeyEvent) {}
    fn on_window_event(&mut self, _event: &WindowEvent) -> EventState {
        EventState::default()
    }
    fn on_resize(&mut self, _plugin_registry: &mut PluginRegistry, _draw_context: &DrawContext) {}
    fn on_update(
        &mut self,
        _plugin_registry: &mut PluginRegistry,
        _draw_context: &mut DrawContext,
        _time_info: &TimeInfo,
    ) {
    }
    fn on_render(
        &mut self,
        _plugin_registry: &mut PluginRegistry,
        _render_context: &RenderContext,
        _render_pass: &mut wgpu::RenderPass<'static>,
    ) {
    }
    fn is_finished(&self) -> bool {
        false
    }
}

pub type RenderLoopBuilder =
    dyn Fn(LaunchContext) -> anyhow::Result<Box<dyn RenderLoopHandler>>;

/// Everything alive while a lesson runs. Fields drop in declaration order:
/// the lesson and its plugins go away before the GPU context they use.
pub(crate) struct RenderLoopSession {
    handler: Box<dyn RenderLoopHandler>,
    plugin_registry: PluginRegistry,
    time_info: TimeInfo,
    last_frame: Instant,
    pub(crate) draw_context: DrawContext,
}

impl RenderLoopSession {
    pub(crate) fn start(
        mut draw_context: DrawContext,
        builder: &RenderLoopBuilder,
    ) -> anyhow::Result<Self> {
        let mut plugin_registry = PluginRegistry::default();
        let handler = builder(LaunchContext {
            draw_context: &mut draw_context,
            plugin_registry: &mut plugin_registry,
        })?;
        let mut session = Self {
            handler,
            plugin_registry,
            time_info: TimeInfo::default(),
            last_frame: Instant::now(),
            draw_context,
        };
        session.notify_resize();
        info!("Render loop started");
        Ok(session)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handler.is_finished()
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.draw_context.resize(width, height);
        self.notify_resize();
    }

    fn notify_resize(&mut self) {
        for plugin in self.plugin_registry.iter_mut() {
            plugin.on_resize(&self.draw_context);
        }
        self.handler
            .on_resize(&mut self.plugin_registry, &self.draw_context);
    }

    pub(crate) fn on_window_event(&mut self, event: &WindowEvent) {
        dispatch_window_event(&mut self.plugin_registry, self.handler.as_mut(), event);
    }

    pub(crate) fn on_device_event(&mut self, event: &DeviceEvent) {
        for plugin in self.plugin_registry.iter_mut_rev() {
            if plugin.on_mouse_event(event).processed {
                return;
            }
        }
        self.handler.on_mouse_event(event);
    }

    /// Runs one iteration of the loop: lesson update, plugin update, then a
    /// render pass shared by the lesson and every plugin.
    pub(crate) fn render_frame(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        self.time_info.processing_delta = now - self.last_frame;
        self.last_frame = now;
        if self.draw_context.is_minimised() {
            debug!("Skipping frame on minimised surface");
            return Ok(());
        }
        let Self {
            handler,
            plugin_registry,
            time_info,
            draw_context,
            ..
        } = self;
        handler.on_update(plugin_registry, draw_context, time_info);
        for plugin in plugin_registry.iter_mut() {
            plugin.on_update(draw_context, time_info);
        }
        let draw_context: &DrawContext = draw_context;
        draw_context.render_scene(|render_pass| {
            let mut render_pass = render_pass.forget_lifetime();
            let render_context = RenderContext {
                time_info,
                draw_context,
                _private: (),
            };
            handler.on_render(plugin_registry, &render_context, &mut render_pass);
            for plugin in plugin_registry.iter_mut() {
                plugin.on_render(&render_context, &mut render_pass);
            }
        })
    }
}

/// Events that end an interaction reach every plugin even when one above
/// already consumed them, so that a drag started on the scene always ends.
fn is_interaction_end(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } | WindowEvent::CursorLeft { .. }
    )
}

/// Plugins see window events from the last registered to the first, and the
/// lesson handler last. Dispatch stops at the first plugin that consumes it.
fn dispatch_window_event(
    plugin_registry: &mut PluginRegistry,
    handler: &mut dyn RenderLoopHandler,
    event: &WindowEvent,
) {
    if let WindowEvent::KeyboardInput { event, .. } = event {
        for plugin in plugin_registry.iter_mut_rev() {
            plugin.on_keyboard_event(event);
        }
        handler.on_keyboard_event(event);
    }
    let broadcast = is_interaction_end(event);
    let mut consumed = false;
    for plugin in plugin_registry.iter_mut_rev() {
        if consumed && !broadcast {
            return;
        }
        consumed |= plugin.on_window_event(event).processed;
    }
    if !consumed || broadcast {
        handler.on_window_event(event);
    }
}

impl Drop for RenderLoopSession {
    fn drop(&mut self) {
        info!("Render loop stopped, releasing GPU resources");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use approx::assert_abs_diff_eq;
    use cgmath::Point3;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, MouseButton};

    use super::*;
    use crate::cameras::{Camera, PerspectiveConfig};
    use crate::controls::OrbitControls;
    use crate::plugins::Plugin;

    fn mouse_button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: unsafe { DeviceId::dummy() },
            state,
            button: MouseButton::Left,
        }
    }

    fn cursor_at(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: unsafe { DeviceId::dummy() },
            position: PhysicalPosition::new(x, y),
        }
    }

    /// Stands for a GUI panel covering part of the window.
    #[derive(Default)]
    struct Panel {
        hovered: bool,
        seen: u32,
    }

    impl Plugin for Panel {
        fn on_window_event(&mut self, _event: &WindowEvent) -> EventState {
            self.seen += 1;
            EventState {
                processed: self.hovered,
            }
        }
        fn on_render(&mut self, _: &RenderContext, _: &mut wgpu::RenderPass<'static>) {}
    }

    struct OrbitScene {
        controls: OrbitControls,
        camera: Camera,
        seen: u32,
    }

    impl OrbitScene {
        fn new() -> Self {
            let mut camera: Camera = PerspectiveConfig::new(75.0, 1.0, 1.0, 1000.0).into();
            camera.set_position(Point3::new(0., 0., 5.));
            let mut controls = OrbitControls::default();
            controls.set_screen_size(crate::Dimensions {
                width: 800,
                height: 600,
            });
            Self {
                controls,
                camera,
                seen: 0,
            }
        }
    }

    impl Plugin for OrbitScene {
        fn on_window_event(&mut self, event: &WindowEvent) -> EventState {
            self.seen += 1;
            self.controls.on_window_event(event)
        }
        fn on_render(&mut self, _: &RenderContext, _: &mut wgpu::RenderPass<'static>) {}
    }

    #[derive(Default)]
    struct Lesson {
        window_events: u32,
    }

    impl RenderLoopHandler for Lesson {
        fn on_window_event(&mut self, _event: &WindowEvent) -> EventState {
            self.window_events += 1;
            EventState::default()
        }
    }

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::default();
        registry.register(OrbitScene::new());
        registry.register(Panel::default());
        registry
    }

    fn set_hovered(registry: &mut PluginRegistry, hovered: bool) {
        if let Some(panel) = registry.get_mut::<Panel>() {
            panel.hovered = hovered;
        }
    }

    #[test]
    fn consumed_events_stop_at_the_top_plugin() {
        let mut registry = registry();
        let mut lesson = Lesson::default();
        set_hovered(&mut registry, true);
        dispatch_window_event(&mut registry, &mut lesson, &cursor_at(10., 10.));
        assert_eq!(registry.get::<Panel>().map(|p| p.seen), Some(1));
        assert_eq!(registry.get::<OrbitScene>().map(|s| s.seen), Some(0));
        assert_eq!(lesson.window_events, 0);

        set_hovered(&mut registry, false);
        dispatch_window_event(&mut registry, &mut lesson, &cursor_at(10., 10.));
        assert_eq!(registry.get::<OrbitScene>().map(|s| s.seen), Some(1));
        assert_eq!(lesson.window_events, 1);
    }

    #[test]
    fn releases_reach_every_plugin() {
        let mut registry = registry();
        let mut lesson = Lesson::default();
        set_hovered(&mut registry, true);
        dispatch_window_event(&mut registry, &mut lesson, &mouse_button(ElementState::Released));
        let left = WindowEvent::CursorLeft {
            device_id: unsafe { DeviceId::dummy() },
        };
        dispatch_window_event(&mut registry, &mut lesson, &left);
        assert_eq!(registry.get::<OrbitScene>().map(|s| s.seen), Some(2));
        assert_eq!(lesson.window_events, 2);
    }

    #[test]
    fn drag_released_over_panel_stops_orbiting() {
        let mut registry = registry();
        let mut lesson = Lesson::default();
        for event in [
            mouse_button(ElementState::Pressed),
            cursor_at(100., 100.),
            cursor_at(150., 100.),
        ] {
            dispatch_window_event(&mut registry, &mut lesson, &event);
        }
        let Some(scene) = registry.get_mut::<OrbitScene>() else {
            panic!("scene registered");
        };
        scene.controls.update(&mut scene.camera);
        let after_drag = scene.camera.eye_position();
        assert!((after_drag.x).abs() > 0.1, "drag should rotate the camera");

        set_hovered(&mut registry, true);
        dispatch_window_event(&mut registry, &mut lesson, &mouse_button(ElementState::Released));
        set_hovered(&mut registry, false);
        dispatch_window_event(&mut registry, &mut lesson, &cursor_at(400., 100.));

        let Some(scene) = registry.get_mut::<OrbitScene>() else {
            panic!("scene registered");
        };
        scene.controls.update(&mut scene.camera);
        assert_abs_diff_eq!(scene.camera.eye_position(), after_drag, epsilon = 1e-4);
    }

    struct CountingLesson {
        updates: Rc<Cell<u32>>,
    }

    impl RenderLoopHandler for CountingLesson {
        fn on_update(&mut self, _: &mut PluginRegistry, _: &mut DrawContext, _: &TimeInfo) {
            self.updates.set(self.updates.get() + 1);
        }
    }

    #[test]
    fn minimised_session_skips_frames() {
        let Some(draw_context) = crate::draw_context::headless_test_context() else {
            return;
        };
        let updates = Rc::new(Cell::new(0));
        let shared = Rc::clone(&updates);
        let builder = move |_: LaunchContext<'_>| -> anyhow::Result<Box<dyn RenderLoopHandler>> {
            Ok(Box::new(CountingLesson {
                updates: Rc::clone(&shared),
            }))
        };
        let mut session = RenderLoopSession::start(draw_context, &builder).expect("session");

        session.resize(0, 0);
        session.render_frame().expect("skipped frame");
        session.render_frame().expect("skipped frame");
        assert_eq!(updates.get(), 0);

        session.resize(320, 240);
        session.render_frame().expect("rendered frame");
        assert_eq!(updates.get(), 1);
        assert_eq!(session.draw_context.surface_dimensions().width, 320);
    }
}
