use std::fmt;

/// Wraps a hue in degrees into `[0, 360)`.
pub fn wrap_hue(hue: f32) -> f32 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Straight (non-premultiplied) RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b),
            to_byte(self.a),
        ]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Rgba::new(
            bytes[0] as f32 / 255.0,
            bytes[1] as f32 / 255.0,
            bytes[2] as f32 / 255.0,
            bytes[3] as f32 / 255.0,
        )
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hue/saturation/lightness/alpha color, as used by the orbit dots.
///
/// Saturation and lightness are percentages (`0..=100`), alpha is `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self {
            h: wrap_hue(h),
            s,
            l,
            a,
        }
    }

    /// Advances the hue by `degrees`, wrapping at 360.
    pub fn rotate(&mut self, degrees: f32) {
        self.h = wrap_hue(self.h + degrees);
    }

    pub fn to_rgba(self) -> Rgba {
        let [r, g, b] = hsl_to_rgb(self.h, self.s / 100.0, self.l / 100.0);
        Rgba::new(r, g, b, self.a.clamp(0.0, 1.0))
    }
}

impl fmt::Display for Hsla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsla({}, {}%, {}%, {})", self.h, self.s, self.l, self.a)
    }
}

/// Converts HSL (hue in degrees, saturation and lightness in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = wrap_hue(hue) / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-4, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn primary_hues_convert_to_rgb() {
        assert_rgb(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]);
        assert_rgb(hsl_to_rgb(120.0, 1.0, 0.5), [0.0, 1.0, 0.0]);
        assert_rgb(hsl_to_rgb(240.0, 1.0, 0.5), [0.0, 0.0, 1.0]);
        assert_rgb(hsl_to_rgb(60.0, 0.5, 0.5), [0.75, 0.75, 0.25]);
    }

    #[test]
    fn rotate_wraps_at_full_circle() {
        let mut hue = Hsla::new(359.75, 100.0, 50.0, 1.0);
        hue.rotate(0.5);
        assert!((hue.h - 0.25).abs() < 1e-4);
        hue.rotate(-0.5);
        assert!((hue.h - 359.75).abs() < 1e-3);
    }

    #[test]
    fn wrap_hue_stays_below_360() {
        for value in [-1e-7_f32, 360.0, 720.0, -360.0, 1234.5] {
            let wrapped = wrap_hue(value);
            assert!((0.0..360.0).contains(&wrapped), "{value} -> {wrapped}");
        }
    }

    #[test]
    fn formats_like_css() {
        let hue = Hsla::new(120.0, 100.0, 50.0, 1.0);
        assert_eq!(hue.to_string(), "hsla(120, 100%, 50%, 1)");
    }

    #[test]
    fn lerp_clamps_and_interpolates() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 2.0), Rgba::WHITE);
        assert_eq!(Rgba::WHITE.to_bytes(), [255, 255, 255, 255]);
    }
}
