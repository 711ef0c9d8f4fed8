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

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::draw_context::{Dimensions, DrawContext};
use crate::render_loop::{RenderLoopBuilder, RenderLoopSession};

/// How the lesson window is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub title: String,
    /// `None` follows the size of the window, or of the browser page on the
    /// web, and every later resize.
    pub size: Option<Dimensions>,
    pub resizable: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: env!("CARGO_PKG_NAME").to_string(),
            size: None,
            resizable: true,
        }
    }
}

impl WindowOptions {
    #[must_use]
    pub fn fill(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fixed(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            size: Some(Dimensions { width, height }),
            resizable: false,
        }
    }
}

pub(crate) enum AppEvent {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    DrawContextReady(Box<DrawContext>),
}

struct App {
    builder: Box<RenderLoopBuilder>,
    options: WindowOptions,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<AppEvent>,
    window: Option<Arc<Window>>,
    pending_size: Option<PhysicalSize<u32>>,
    session: Option<RenderLoopSession>,
}

impl App {
    fn window_attributes(&self) -> winit::window::WindowAttributes {
        let mut attributes = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_resizable(self.options.resizable);
        if let Some(Dimensions { width, height }) = self.options.size {
            attributes = attributes.with_inner_size(PhysicalSize::new(width, height));
        }
        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            attributes = attributes.with_append(true);
        }
        attributes
    }

    fn start_session(&mut self, draw_context: DrawContext, event_loop: &ActiveEventLoop) {
        match RenderLoopSession::start(draw_context, self.builder.as_ref()) {
            Ok(mut session) => {
                if let Some(size) = self.pending_size.take() {
                    session.resize(size.width, size.height);
                }
                self.session = Some(session);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(err) => {
                error!("Could not start the render loop: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        // Lesson and plugins go first, then the GPU context, then the window
        self.session = None;
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Could not create window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(Arc::clone(&window));
        let dimensions = self.options.size;
        #[cfg(not(target_arch = "wasm32"))]
        {
            use pollster::FutureExt;
            match DrawContext::new(Some(window), dimensions).block_on() {
                Ok(draw_context) => self.start_session(draw_context, event_loop),
                Err(err) => {
                    error!("Could not create draw context: {err:#}");
                    event_loop.exit();
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match DrawContext::new(Some(window), dimensions).await {
                    Ok(draw_context) => {
                        if proxy
                            .send_event(AppEvent::DrawContextReady(Box::new(draw_context)))
                            .is_err()
                        {
                            warn!("Event loop closed before the draw context was ready");
                        }
                    }
                    Err(err) => error!("Could not create draw context: {err:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::DrawContextReady(draw_context) => {
                info!("Draw context ready");
                self.start_session(*draw_context, event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = self.session.as_mut() else {
            // Nothing can render until the draw context exists
            match event {
                WindowEvent::Resized(size) => self.pending_size = Some(size),
                WindowEvent::CloseRequested => self.stop(event_loop),
                _ => {}
            }
            return;
        };
        session.on_window_event(&event);
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.stop(event_loop);
            }
            WindowEvent::Resized(size) => {
                debug!("Window resized to {}x{}", size.width, size.height);
                session.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = session.render_frame() {
                    match err.downcast_ref::<wgpu::SurfaceError>() {
                        Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            warn!("Surface lost or outdated, reconfiguring");
                            session.draw_context.reconfigure();
                        }
                        Some(wgpu::SurfaceError::Timeout) => warn!("Surface timeout"),
                        _ => {
                            error!("Frame failed: {err:#}");
                            self.stop(event_loop);
                            return;
                        }
                    }
                }
                if session.is_finished() {
                    info!("Lesson finished");
                    self.stop(event_loop);
                } else if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(session) = self.session.as_mut() {
            session.on_device_event(&event);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.session = None;
    }
}

pub(crate) fn init_event_loop(
    options: WindowOptions,
    builder: Box<RenderLoopBuilder>,
) -> anyhow::Result<()> {
    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    #[allow(unused_mut)]
    let mut app = App {
        builder,
        options,
        proxy: event_loop.create_proxy(),
        window: None,
        pending_size: None,
        session: None,
    };
    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut app)?;
    }
    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }
    Ok(())
}
