//! Jittered "electric" strokes between every pair of dots.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;

use crate::canvas::{Canvas, Glow, Gradient};
use crate::color::Rgba;
use crate::orbit::{Dot, DotId};

/// Interior points of each stroke, as fractions of the way from A to B.
pub const JITTER_FRACTIONS: [f32; 4] = [0.25, 0.45, 0.65, 0.85];

/// Unordered pair identity; `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(DotId, DotId);

impl PairKey {
    pub fn new(a: DotId, b: DotId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn ids(&self) -> (DotId, DotId) {
        (self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairStyle {
    /// Width of the uniform jitter window in pixels.
    pub jitter: f32,
    /// Offset added before subtracting the jitter, so displacement lies in
    /// `(bias - jitter, bias]`.
    pub bias: f32,
    pub glow: Option<Glow>,
}

impl Default for PairStyle {
    fn default() -> Self {
        Self {
            jitter: 20.0,
            bias: 12.0,
            glow: Some(Glow {
                color: Rgba::new(1.0, 1.0, 1.0, 0.3),
                blur: 10.0,
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DotPairer {
    style: PairStyle,
}

impl DotPairer {
    pub fn new(style: PairStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &PairStyle {
        &self.style
    }

    /// Every unordered pair of distinct dots, each once, in first-seen order.
    pub fn pairs<'a>(&self, dots: &'a [Dot]) -> Vec<(&'a Dot, &'a Dot)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for a in dots {
            for b in dots {
                if a.id() == b.id() {
                    continue;
                }
                if seen.insert(PairKey::new(a.id(), b.id())) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Stroke points from `from` to `to` with freshly jittered interior points.
    pub fn jittered_path<R: Rng + ?Sized>(&self, from: Vec2, to: Vec2, rng: &mut R) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(JITTER_FRACTIONS.len() + 2);
        points.push(from);
        for fraction in JITTER_FRACTIONS {
            let base = from.lerp(to, fraction);
            let offset = Vec2::new(
                self.style.bias - rng.gen::<f32>() * self.style.jitter,
                self.style.bias - rng.gen::<f32>() * self.style.jitter,
            );
            points.push(base + offset);
        }
        points.push(to);
        points
    }

    /// Strokes every pair and returns how many were drawn.
    pub fn draw<R: Rng + ?Sized>(&self, dots: &[Dot], canvas: &mut dyn Canvas, rng: &mut R) -> usize {
        let pairs = self.pairs(dots);
        for (a, b) in &pairs {
            let gradient = Gradient {
                from: a.position(),
                to: b.position(),
                start: a.hue().to_rgba(),
                end: b.hue().to_rgba(),
            };
            let points = self.jittered_path(a.position(), b.position(), rng);
            canvas.stroke_polyline(&points, &gradient, self.style.glow);
        }
        pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::color::Hsla;
    use crate::orbit::{Direction, DotBuilder, IdGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dots(count: usize) -> Vec<Dot> {
        let mut rng = StdRng::seed_from_u64(4);
        let mut ids = IdGenerator::new();
        (0..count)
            .map(|i| {
                let share = i as f32 / count as f32;
                DotBuilder::new(200.0, 1.0)
                    .angle((share * 360.0).floor())
                    .direction(Direction::Forward)
                    .velocity(0.08)
                    .hue(Hsla::new(share * 360.0, 100.0, 50.0, 1.0))
                    .build(ids.next_id(), Vec2::new(400.0, 300.0), &mut rng)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn pair_key_ignores_order() {
        let a = DotId::new(1);
        let b = DotId::new(7);
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(PairKey::new(b, a).ids(), (a, b));
    }

    #[test]
    fn six_dots_make_fifteen_strokes() {
        let dots = dots(6);
        let pairer = DotPairer::default();
        let mut canvas = RecordingCanvas::new(800, 600);
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(pairer.draw(&dots, &mut canvas, &mut rng), 15);
        assert_eq!(canvas.polylines().count(), 15);

        let keys: HashSet<_> = pairer
            .pairs(&dots)
            .iter()
            .map(|(a, b)| PairKey::new(a.id(), b.id()))
            .collect();
        assert_eq!(keys.len(), 15);
    }

    #[test]
    fn degenerate_sets_draw_nothing() {
        let pairer = DotPairer::default();
        let mut canvas = RecordingCanvas::new(10, 10);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pairer.draw(&[], &mut canvas, &mut rng), 0);
        assert_eq!(pairer.draw(&dots(1), &mut canvas, &mut rng), 0);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn strokes_end_on_dots_with_bounded_jitter() {
        let dots = dots(3);
        let pairer = DotPairer::default();
        let mut canvas = RecordingCanvas::new(800, 600);
        let mut rng = StdRng::seed_from_u64(21);
        pairer.draw(&dots, &mut canvas, &mut rng);

        for ((a, b), points) in pairer.pairs(&dots).iter().zip(canvas.polylines()) {
            assert_eq!(points.len(), 6);
            assert_eq!(points[0], a.position());
            assert_eq!(points[5], b.position());
            for (point, fraction) in points[1..5].iter().zip(JITTER_FRACTIONS) {
                let offset = *point - a.position().lerp(b.position(), fraction);
                for axis in [offset.x, offset.y] {
                    assert!((-8.0 - 1e-3..=12.0 + 1e-3).contains(&axis), "offset {axis}");
                }
            }
        }
    }

    #[test]
    fn jitter_is_fresh_every_frame() {
        let pairer = DotPairer::default();
        let mut rng = StdRng::seed_from_u64(3);
        let first = pairer.jittered_path(Vec2::ZERO, Vec2::new(100.0, 0.0), &mut rng);
        let second = pairer.jittered_path(Vec2::ZERO, Vec2::new(100.0, 0.0), &mut rng);
        assert_ne!(first, second);
    }
}
