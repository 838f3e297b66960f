//! GPU presentation of software-rendered frames.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `pipeline` builds the single full-screen blit pipeline and its bind group
//!   layout (frame texture plus sampler).
//! - `state` glues everything together: it uploads each [`scene::Frame`] into
//!   a texture, draws it over the surface and presents.

mod context;
mod pipeline;
mod state;

pub(crate) use state::GpuState;
