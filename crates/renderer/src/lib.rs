//! Presentation layer for the `vibes` demos.
//!
//! Demos draw into CPU-side [`scene::Frame`]s; this crate decides where those
//! frames go. The overall flow is:
//!
//! ```text
//!   CLI / vibes
//!          │ RendererConfig + Box<dyn Demo>
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          │                                      │
//!          │                                      └─▶ tick demo ─▶ upload ─▶ blit
//!          └─▶ (Export policy) export_png ──▶ PNG on disk
//! ```
//!
//! `WindowState` owns all GPU resources (surface, device, blit pipeline and the
//! frame texture), while `Renderer` is the thin entry point that chooses between
//! the interactive window and headless export.

mod compile;
mod export;
mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;
use scene::{Deadline, Demo, StopSignal};

pub use runtime::{FrameScheduler, RenderPolicy};
pub use types::{AdapterProfile, RendererConfig};

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives inside `WindowState`; `Renderer` simply selects the
/// presentation path and forwards the request.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Presents `demo` according to the configured policy.
    ///
    /// Windowed runs return once the window closes or `run_for` elapses.
    /// Export runs return after the PNG is written.
    pub fn run(&mut self, demo: Box<dyn Demo>) -> Result<()> {
        let stop = self
            .config
            .run_for
            .map(|duration| Box::new(Deadline::after(duration)) as Box<dyn StopSignal>);
        self.run_until(demo, stop)
    }

    /// Like [`Renderer::run`], but windowed runs also close when `stop` fires.
    pub fn run_until(
        &mut self,
        mut demo: Box<dyn Demo>,
        stop: Option<Box<dyn StopSignal>>,
    ) -> Result<()> {
        match &self.config.policy {
            RenderPolicy::Export { path, frames } => {
                export::export_png(demo.as_mut(), self.config.surface_size, *frames, path)?;
                Ok(())
            }
            RenderPolicy::Animate { .. } => window::run_window(&self.config, demo, stop),
        }
    }
}
