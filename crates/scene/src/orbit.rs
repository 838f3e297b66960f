//! Orbiting dots for the 2D demo.

use std::fmt;

use glam::Vec2;
use rand::Rng;

use crate::canvas::{Canvas, Glow};
use crate::color::Hsla;
use crate::error::SceneError;

/// Unique identity of a dot within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DotId(u32);

impl DotId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dot#{}", self.0)
    }
}

/// Hands out sequential ids starting at zero.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> DotId {
        let id = DotId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Per-tick facts about the surface every renderable may consult.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    pub width: u32,
    pub height: u32,
    pub center: Vec2,
}

impl StepContext {
    pub fn for_surface(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            center: Vec2::new(width as f32 / 2.0, height as f32 / 2.0),
        }
    }
}

/// Anything the orbit session can step and draw.
pub trait Renderable {
    fn step(&mut self, ctx: &StepContext);
    fn draw(&self, canvas: &mut dyn Canvas);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }
}

/// Point at `degrees` on the circle of `radius` around `center`.
pub fn point_on_circle(center: Vec2, radius: f32, degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    center + Vec2::new(radians.cos(), radians.sin()) * radius
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    id: DotId,
    orbit: f32,
    radius: f32,
    angle: f32,
    velocity: f32,
    direction: Direction,
    hue: Hsla,
    hue_step: f32,
    glow_blur: f32,
    position: Vec2,
}

impl Dot {
    pub fn id(&self) -> DotId {
        self.id
    }

    pub fn orbit(&self) -> f32 {
        self.orbit
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Current angle in degrees, `[0, 360)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn hue(&self) -> Hsla {
        self.hue
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }
}

impl Renderable for Dot {
    fn step(&mut self, ctx: &StepContext) {
        self.angle = (self.angle + self.velocity * self.direction.sign()).rem_euclid(360.0);
        if self.angle >= 360.0 {
            self.angle = 0.0;
        }
        self.position = point_on_circle(ctx.center, self.orbit, self.angle);
        self.hue.rotate(self.hue_step);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let color = self.hue.to_rgba();
        canvas.fill_circle(
            self.position,
            self.radius,
            color,
            Some(Glow {
                color,
                blur: self.glow_blur,
            }),
        );
    }
}

/// Builds a [`Dot`]. Angle, direction, velocity and hue fall back to random
/// values when left unset.
#[derive(Debug, Clone)]
pub struct DotBuilder {
    orbit: f32,
    radius: f32,
    angle: Option<f32>,
    direction: Option<Direction>,
    velocity: Option<f32>,
    hue: Option<Hsla>,
    hue_step: f32,
    glow_blur: f32,
}

impl DotBuilder {
    pub fn new(orbit: f32, radius: f32) -> Self {
        Self {
            orbit,
            radius,
            angle: None,
            direction: None,
            velocity: None,
            hue: None,
            hue_step: 0.5,
            glow_blur: 25.0,
        }
    }

    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = Some(degrees);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn velocity(mut self, velocity: f32) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn hue(mut self, hue: Hsla) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn hue_step(mut self, degrees: f32) -> Self {
        self.hue_step = degrees;
        self
    }

    pub fn glow_blur(mut self, blur: f32) -> Self {
        self.glow_blur = blur;
        self
    }

    /// Creates the dot already placed on its orbit around `center`.
    pub fn build<R: Rng + ?Sized>(
        self,
        id: DotId,
        center: Vec2,
        rng: &mut R,
    ) -> Result<Dot, SceneError> {
        if !(self.orbit.is_finite() && self.orbit >= 0.0) {
            return Err(SceneError::invalid("orbit", "must be finite and non-negative"));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SceneError::invalid("radius", "must be positive"));
        }
        if let Some(velocity) = self.velocity {
            if !velocity.is_finite() {
                return Err(SceneError::invalid("velocity", "must be finite"));
            }
        }

        let angle = self
            .angle
            .unwrap_or_else(|| rng.gen::<f32>() * 360.0)
            .rem_euclid(360.0);
        let direction = self.direction.unwrap_or_else(|| Direction::random(rng));
        let velocity = self
            .velocity
            .unwrap_or_else(|| 0.3 + rng.gen::<f32>() * 0.5);
        let hue = self
            .hue
            .unwrap_or_else(|| Hsla::new(rng.gen::<f32>() * 360.0, 100.0, 50.0, 1.0));

        Ok(Dot {
            id,
            orbit: self.orbit,
            radius: self.radius,
            angle,
            velocity,
            direction,
            hue,
            hue_step: self.hue_step,
            glow_blur: self.glow_blur.max(0.0),
            position: point_on_circle(center, self.orbit, angle),
        })
    }
}
