use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use scene::{Demo, Frame, LoopDriver, StopSignal};
use tracing::{info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{FrameScheduler, RenderPolicy};
use crate::types::{AdapterProfile, RendererConfig};

const SOFTWARE_FPS_CAP: f32 = 30.0;

/// Window, GPU resources and the demo session they present.
pub(crate) struct WindowState {
    // Dropped before `window`; the surface borrows its handles.
    gpu: GpuState,
    window: Arc<Window>,
    demo: Box<dyn Demo>,
    frame: Frame,
    driver: LoopDriver,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, mut demo: Box<dyn Demo>) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size)?;
        let mut frame = Frame::new(size.width, size.height);
        demo.resize(&mut frame, size.width, size.height);
        Ok(Self {
            gpu,
            window,
            demo,
            frame,
            driver: LoopDriver::new(),
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        self.gpu.adapter_profile()
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.driver.ticks()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        if self
            .demo
            .resize(&mut self.frame, new_size.width, new_size.height)
        {
            tracing::debug!(
                width = new_size.width,
                height = new_size.height,
                demo = self.demo.name(),
                "surface resized"
            );
        }
    }

    /// Runs one tick of the demo and presents the result.
    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        tick_and_present(
            &mut self.gpu,
            &mut self.driver,
            self.demo.as_mut(),
            &mut self.frame,
        )
    }

    fn recover_surface(&mut self) {
        self.gpu.reconfigure();
    }
}

/// Where finished frames go: a swapchain image is acquired, then filled.
pub(crate) trait FramePresenter {
    type Target;

    fn acquire(&mut self) -> Result<Self::Target, wgpu::SurfaceError>;
    fn present(&mut self, target: Self::Target, frame: &Frame);
}

impl FramePresenter for GpuState {
    type Target = wgpu::SurfaceTexture;

    fn acquire(&mut self) -> Result<Self::Target, wgpu::SurfaceError> {
        self.acquire_surface()
    }

    fn present(&mut self, target: Self::Target, frame: &Frame) {
        self.present_frame(target, frame);
    }
}

/// Ticks the demo only once a surface image is in hand, so a lost or
/// outdated surface never swallows a tick.
pub(crate) fn tick_and_present<P: FramePresenter>(
    presenter: &mut P,
    driver: &mut LoopDriver,
    demo: &mut dyn Demo,
    frame: &mut Frame,
) -> Result<(), wgpu::SurfaceError> {
    let target = presenter.acquire()?;
    driver.tick(demo, frame);
    presenter.present(target, frame);
    Ok(())
}

/// Picks the pacing policy, capping uncapped software adapters.
fn effective_policy(policy: &RenderPolicy, profile: &AdapterProfile) -> RenderPolicy {
    match policy {
        RenderPolicy::Animate { target_fps: None } if profile.is_software() => {
            warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping window to {} FPS (override with --fps)",
                SOFTWARE_FPS_CAP
            );
            RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP),
            }
        }
        other => other.clone(),
    }
}

/// Opens a window and ticks `demo` once per redraw until the window closes
/// or `stop` fires.
pub(crate) fn run_window(
    config: &RendererConfig,
    demo: Box<dyn Demo>,
    mut stop: Option<Box<dyn StopSignal>>,
) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, demo)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err}"))?;

    let policy = effective_policy(&config.policy, state.adapter_profile());
    let mut scheduler = FrameScheduler::new(&policy);
    info!(
        demo = state.demo.name(),
        width = window_size.width,
        height = window_size.height,
        ?policy,
        "window ready"
    );
    state.window().request_redraw();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                }
                WindowEvent::RedrawRequested => {
                    if let Some(stop) = stop.as_mut() {
                        if stop.should_stop(state.ticks()) {
                            info!(ticks = state.ticks(), "stop signal received; closing window");
                            elwt.exit();
                            return;
                        }
                    }
                    match state.render_frame() {
                        Ok(()) => scheduler.mark_rendered(),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.recover_surface();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if scheduler.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = scheduler.next_deadline() {
                let ms = deadline.saturating_duration_since(now).as_millis();
                tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
        }
        Event::LoopExiting => {
            let size = state.size();
            info!(
                ticks = state.ticks(),
                width = size.width,
                height = size.height,
                "window closed"
            );
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
