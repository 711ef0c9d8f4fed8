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

mod launcher;
mod window;

pub(crate) mod draw_context;
pub(crate) mod render_loop;

pub mod cameras;
pub mod controls;
pub mod gui;
pub mod lights;
pub mod materials;
pub mod plugins;
pub mod primitives;
pub mod textures;

pub use draw_context::*;
pub use launcher::{ENV_HEADLESS, launch_app, launch_app_with_options};
pub use render_loop::*;
pub use window::WindowOptions;

#[cfg(feature = "egui")]
pub use egui;
pub use wgpu;
pub use winit::event::{DeviceEvent, KeyEvent, WindowEvent};
