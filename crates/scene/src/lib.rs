//! Scene building, stepping and software rendering for the `vibes` demos.
//!
//! Both demos share one shape: build once, then step and draw every tick.
//!
//! ```text
//!   TubeDemoParams / OrbitDemoParams
//!          │ new()
//!          ▼
//!   TubeDemo | OrbitDemo ──▶ LoopDriver::tick ──▶ step() ──▶ draw(&mut Frame)
//!                                 ▲                                 │
//!                                 └── StopSignal              RGBA8 pixels
//! ```
//!
//! * `tube`: cubes ringed around a closed Catmull-Rom path ([`spline`],
//!   [`tube`]), seen by a camera flying the path ([`camera`]) and drawn by a
//!   depth-buffered rasterizer with range fog ([`raster`]).
//! * `orbit`: dots circling the surface center ([`orbit`]) joined by jittered
//!   gradient strokes ([`pairing`]) on a 2D [`canvas`] that fades to black.
//!
//! Frames are plain pixel buffers so the same session can feed a window, a
//! PNG exporter, or a test.

pub mod camera;
pub mod canvas;
pub mod color;
pub mod demo;
pub mod driver;
pub mod error;
pub mod noise;
pub mod orbit;
pub mod pairing;
pub mod raster;
pub mod spline;
pub mod tube;

pub use camera::{Camera, CameraRig};
pub use canvas::{Canvas, Composite, Frame, Glow, Gradient, RecordingCanvas};
pub use color::{Hsla, Rgba};
pub use demo::{Demo, OrbitDemo, OrbitDemoParams, TubeDemo, TubeDemoParams};
pub use driver::{Deadline, LoopDriver, StopFlag, StopSignal, TickBudget};
pub use error::SceneError;
pub use orbit::{Direction, Dot, DotBuilder, DotId, IdGenerator, Renderable, StepContext};
pub use pairing::{DotPairer, PairKey, PairStyle};
pub use raster::{Fog, TubeRasterizer};
pub use spline::{CatmullRomPath, FrenetFrame};
pub use tube::{Cube, Tube, TubeParams};
