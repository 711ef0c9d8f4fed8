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
use std::env;

use crate::{
    LaunchContext,
    render_loop::{RenderLoopBuilder, RenderLoopHandler},
    window::{WindowOptions, init_event_loop},
};

const GLOBAL_LOG_FILTER: log::LevelFilter = log::LevelFilter::Info;
pub const ENV_HEADLESS: &str = "HEADLESS";

/// Runs a lesson in a default window, or headless when `HEADLESS` is set.
pub fn launch_app<F>(builder: F) -> anyhow::Result<()>
where
    F: Fn(LaunchContext) -> anyhow::Result<Box<dyn RenderLoopHandler>> + 'static,
{
    launch_app_with_options(WindowOptions::default(), builder)
}

pub fn launch_app_with_options<F>(options: WindowOptions, builder: F) -> anyhow::Result<()>
where
    F: Fn(LaunchContext) -> anyhow::Result<Box<dyn RenderLoopHandler>> + 'static,
{
    init_log();
    info!("Init app {:?}", options.title);
    let is_headless = env::var(ENV_HEADLESS).is_ok();
    if is_headless {
        info!("Running in headless mode");
        run_headless(&options, &builder)
    } else {
        init_event_loop(options, Box::new(builder))
    }
}

fn init_log() {
    let mut builder = fern::Dispatch::new();
    let level_formatter;
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        level_formatter = |level| level;
        builder = builder.chain(fern::Output::call(console_log::log));
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use fern::colors::{Color, ColoredLevelConfig};
        let colors = ColoredLevelConfig::new()
            .info(Color::Blue)
            .debug(Color::Green);
        level_formatter = move |level| colors.color(level);
        builder = builder.chain(std::io::stdout());
    }
    let result = builder
        .level(GLOBAL_LOG_FILTER)
        .level_for(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}:{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                level_formatter(record.level()),
                record.target(),
                record.line().unwrap_or_default(),
                message
            ));
        })
        .apply();
    if result.is_err() {
        debug!("Logger already installed");
    }
}

/// Renders a single frame into an offscreen texture.
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(options: &WindowOptions, builder: &RenderLoopBuilder) -> anyhow::Result<()> {
    use pollster::FutureExt;

    use crate::{draw_context::DrawContext, render_loop::RenderLoopSession};

    let draw_context = DrawContext::new(None, options.size).block_on()?;
    let mut session = RenderLoopSession::start(draw_context, builder)?;
    session.render_frame()?;
    info!("Headless frame rendered");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn run_headless(_options: &WindowOptions, _builder: &RenderLoopBuilder) -> anyhow::Result<()> {
    anyhow::bail!("Headless mode is not supported in WASM")
}
