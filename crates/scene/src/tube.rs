use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use crate::color::{wrap_hue, Hsla, Rgba};
use crate::error::SceneError;
use crate::noise::SimplexNoise;
use crate::spline::CatmullRomPath;

/// Planar `(x, z)` outline of the sample path. The first and last entries
/// coincide so the closed curve returns to its start.
pub const SAMPLE_OUTLINE: [[f32; 2]; 9] = [
    [68.5, 185.5],
    [1.0, 262.5],
    [270.9, 281.9],
    [345.5, 212.8],
    [178.0, 155.7],
    [240.3, 72.3],
    [153.4, 0.6],
    [52.6, 53.3],
    [68.5, 185.5],
];

/// Lifts a planar outline into 3D, giving every point a random height in
/// `[0, height_range)`.
pub fn lift_outline<R: Rng + ?Sized>(outline: &[[f32; 2]], height_range: f32, rng: &mut R) -> Vec<Vec3> {
    outline
        .iter()
        .map(|&[x, z]| Vec3::new(x, rng.gen::<f32>() * height_range, z))
        .collect()
}

/// Shape parameters for [`Tube::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct TubeParams {
    /// Number of rings along the path.
    pub tube_detail: usize,
    /// Number of cubes around each ring.
    pub circle_detail: usize,
    pub radius: f32,
    /// Lower bound of the random radius factor; the upper bound is 1.
    pub min_radius_factor: f32,
    pub cube_size: f32,
    /// Per-axis scale applied to positions before sampling noise.
    pub noise_scale: Vec3,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for TubeParams {
    fn default() -> Self {
        Self {
            tube_detail: 500,
            circle_detail: 10,
            radius: 8.0,
            min_radius_factor: 0.8,
            cube_size: 4.0,
            noise_scale: Vec3::new(0.008, 0.01, 0.005),
            saturation: 50.0,
            lightness: 50.0,
        }
    }
}

impl TubeParams {
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.tube_detail == 0 {
            return Err(SceneError::invalid("tube_detail", "must be at least 1"));
        }
        if self.circle_detail == 0 {
            return Err(SceneError::invalid("circle_detail", "must be at least 1"));
        }
        if !(self.radius > 0.0) {
            return Err(SceneError::invalid("radius", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.min_radius_factor) {
            return Err(SceneError::invalid(
                "min_radius_factor",
                "must lie within [0, 1]",
            ));
        }
        if !(self.cube_size > 0.0) {
            return Err(SceneError::invalid("cube_size", "must be positive"));
        }
        Ok(())
    }
}

/// One static cube of the tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub position: Vec3,
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
    pub color: Rgba,
    pub rotation: Quat,
    /// Index of the ring this cube belongs to.
    pub ring: usize,
}

/// Static container of cubes built once around a path.
#[derive(Debug, Clone)]
pub struct Tube {
    cubes: Vec<Cube>,
    ring_centers: Vec<Vec3>,
    cube_size: f32,
}

impl Tube {
    pub fn build<R: Rng + ?Sized>(
        path: &CatmullRomPath,
        params: &TubeParams,
        noise: &SimplexNoise,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        params.validate()?;

        let frames = path.frenet_frames(params.tube_detail)?;
        let mut cubes = Vec::with_capacity(params.tube_detail * params.circle_detail);
        let mut ring_centers = Vec::with_capacity(params.tube_detail);

        for (ring, frame) in frames.iter().take(params.tube_detail).enumerate() {
            let center = path.point_at(ring as f32 / params.tube_detail as f32);
            ring_centers.push(center);

            for slot in 0..params.circle_detail {
                let angle = slot as f32 / params.circle_detail as f32 * TAU;
                let direction = -angle.cos() * frame.normal + angle.sin() * frame.binormal;
                let factor = rng.gen_range(params.min_radius_factor..=1.0);
                let position = center + direction * (params.radius * factor);

                let scaled = position * params.noise_scale;
                let strength = noise.sample3(scaled.x, scaled.y, scaled.z).abs();
                let hue = wrap_hue(strength * 360.0);
                let color = Hsla::new(hue, params.saturation, params.lightness, 1.0).to_rgba();

                let rotation = Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen::<f32>() * TAU,
                    rng.gen::<f32>() * TAU,
                    rng.gen::<f32>() * TAU,
                );

                cubes.push(Cube {
                    position,
                    hue,
                    color,
                    rotation,
                    ring,
                });
            }
        }

        tracing::debug!(
            cubes = cubes.len(),
            rings = ring_centers.len(),
            path_length = path.length(),
            "built cube tube"
        );

        Ok(Self {
            cubes,
            ring_centers,
            cube_size: params.cube_size,
        })
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn ring_centers(&self) -> &[Vec3] {
        &self.ring_centers
    }

    pub fn cube_size(&self) -> f32 {
        self.cube_size
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }
}
