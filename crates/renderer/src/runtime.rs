use std::path::PathBuf;
use std::time::{Duration, Instant};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames are paced into a window or
/// produced headless and written to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Tick continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap; `None` or `0` is uncapped.
        target_fps: Option<f32>,
    },
    /// Run a fixed number of ticks without a window and save the last frame.
    Export {
        /// Destination path for the PNG.
        path: PathBuf,
        /// Ticks to run before capturing.
        frames: u64,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

impl RenderPolicy {
    /// Minimum spacing between frames, if the policy caps the rate.
    pub fn frame_interval(&self) -> Option<Duration> {
        match self {
            RenderPolicy::Animate {
                target_fps: Some(fps),
            } if fps.is_finite() && *fps > 0.0 => {
                Some(Duration::from_secs_f64(1.0 / f64::from(*fps)))
            }
            _ => None,
        }
    }
}

/// Decides when the next redraw may be issued.
///
/// Uncapped policies are always ready; capped ones wait one frame interval
/// after the previous frame was rendered.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(policy: &RenderPolicy) -> Self {
        Self {
            interval: policy.frame_interval(),
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    /// When the next frame becomes due; `None` means "now".
    pub fn next_deadline(&self) -> Option<Instant> {
        Some(self.last_frame? + self.interval?)
    }

    pub fn mark_rendered(&mut self) {
        self.mark_rendered_at(Instant::now());
    }

    pub fn mark_rendered_at(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}
