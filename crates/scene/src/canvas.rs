//! Software drawing surface.
//!
//! [`Frame`] is an RGBA8 pixel buffer that both demos draw into. The orbit
//! demo talks to it through the [`Canvas`] trait, which mirrors the handful of
//! 2D context operations it needs; [`RecordingCanvas`] implements the same
//! trait by logging calls so draw routines can be inspected without pixels.

use glam::Vec2;

use crate::color::Rgba;

/// How source pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Regular alpha blending.
    #[default]
    SourceOver,
    /// Keeps the brighter of source and destination per channel.
    Lighten,
}

/// Soft halo drawn around a shape, like a 2D context shadow with no offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f32,
}

/// Linear gradient between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub from: Vec2,
    pub to: Vec2,
    pub start: Rgba,
    pub end: Rgba,
}

impl Gradient {
    /// Color at `point`, found by projecting it onto the gradient axis.
    pub fn color_at(&self, point: Vec2) -> Rgba {
        let axis = self.to - self.from;
        let length_squared = axis.length_squared();
        if length_squared <= f32::EPSILON {
            return self.start;
        }
        let t = (point - self.from).dot(axis) / length_squared;
        self.start.lerp(self.end, t)
    }
}

/// The subset of a 2D drawing context used by the orbit demo.
pub trait Canvas {
    fn size(&self) -> (u32, u32);
    fn set_composite(&mut self, mode: Composite);
    /// Paints `color` over the whole surface.
    fn fill(&mut self, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: Option<Glow>);
    /// Strokes an open polyline one pixel wide.
    fn stroke_polyline(&mut self, points: &[Vec2], gradient: &Gradient, glow: Option<Glow>);
}

/// RGBA8 pixel buffer, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    composite: Composite,
}

impl Frame {
    /// Allocates a cleared (transparent black) frame. Zero dimensions are
    /// bumped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            composite: Composite::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn composite(&self) -> Composite {
        self.composite
    }

    /// Resizes and clears the surface. Zero-sized requests (minimized
    /// windows) are ignored and return `false`.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
        true
    }

    /// Overwrites every pixel with `color`, ignoring the composite mode.
    pub fn clear(&mut self, color: Rgba) {
        let bytes = color.to_bytes();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let offset = self.offset(x as i64, y as i64)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(out)
    }

    /// Writes an opaque pixel without blending.
    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(offset) = self.offset(x as i64, y as i64) {
            self.pixels[offset..offset + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Blends `color` into one pixel, scaling its alpha by `coverage`.
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        let alpha = (color.a * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let Some(offset) = self.offset(x, y) else {
            return;
        };

        let mut dst = [0u8; 4];
        dst.copy_from_slice(&self.pixels[offset..offset + 4]);
        let dst = Rgba::from_bytes(dst);
        let mix = |src: f32, dst: f32| match self.composite {
            Composite::SourceOver => src * alpha + dst * (1.0 - alpha),
            Composite::Lighten => src.max(dst) * alpha + dst * (1.0 - alpha),
        };
        let out = Rgba::new(
            mix(color.r, dst.r),
            mix(color.g, dst.g),
            mix(color.b, dst.b),
            alpha + dst.a * (1.0 - alpha),
        );
        self.pixels[offset..offset + 4].copy_from_slice(&out.to_bytes());
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Pixel-space bounding box grown by `pad`, clipped to the frame.
    fn clipped_bounds(&self, min: Vec2, max: Vec2, pad: f32) -> Option<(i64, i64, i64, i64)> {
        let x0 = ((min.x - pad).floor() as i64).max(0);
        let y0 = ((min.y - pad).floor() as i64).max(0);
        let x1 = ((max.x + pad).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((max.y + pad).ceil() as i64).min(self.height as i64 - 1);
        if x0 > x1 || y0 > y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, gradient: &Gradient, glow: Option<Glow>) {
        const HALF_WIDTH: f32 = 0.5;
        let pad = glow.map_or(1.0, |glow| glow.blur.max(1.0));
        let Some((x0, y0, x1, y1)) = self.clipped_bounds(a.min(b), a.max(b), pad) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(pixel, a, b);
                if let Some(glow) = glow {
                    let falloff = gaussian(distance - HALF_WIDTH, glow.blur);
                    self.blend(x, y, glow.color, falloff);
                }
                let coverage = (HALF_WIDTH + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, gradient.color_at(pixel), coverage);
                }
            }
        }
    }
}

impl Canvas for Frame {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_composite(&mut self, mode: Composite) {
        self.composite = mode;
    }

    fn fill(&mut self, color: Rgba) {
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: Option<Glow>) {
        let pad = glow.map_or(1.0, |glow| glow.blur.max(1.0));
        let extent = Vec2::splat(radius);
        let Some((x0, y0, x1, y1)) = self.clipped_bounds(center - extent, center + extent, pad)
        else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = pixel.distance(center);
                if let Some(glow) = glow {
                    if distance > radius {
                        self.blend(x, y, glow.color, gaussian(distance - radius, glow.blur));
                    }
                }
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], gradient: &Gradient, glow: Option<Glow>) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], gradient, glow);
        }
    }
}

/// Falloff of a blurred edge `distance` pixels outside the shape. The blur
/// radius is treated as two standard deviations.
fn gaussian(distance: f32, blur: f32) -> f32 {
    if blur <= 0.0 {
        return 0.0;
    }
    let distance = distance.max(0.0);
    if distance > blur {
        return 0.0;
    }
    let sigma = blur / 2.0;
    (-(distance * distance) / (2.0 * sigma * sigma)).exp()
}

fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let axis = b - a;
    let length_squared = axis.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(axis) / length_squared).clamp(0.0, 1.0);
    point.distance(a + axis * t)
}

/// One call captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Composite(Composite),
    Fill(Rgba),
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        glow: Option<Glow>,
    },
    Polyline {
        points: Vec<Vec2>,
        gradient: Gradient,
        glow: Option<Glow>,
    },
}

/// Canvas that records draw calls instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Vec2]> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_composite(&mut self, mode: Composite) {
        self.commands.push(DrawCommand::Composite(mode));
    }

    fn fill(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            glow,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], gradient: &Gradient, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            gradient: *gradient,
            glow,
        });
    }
}
