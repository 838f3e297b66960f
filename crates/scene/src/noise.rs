//! Seeded 3D simplex noise.
//!
//! Gradient noise on a skewed tetrahedral lattice; output is continuous and
//! lies in `[-1, 1]`. The permutation table is shuffled from the seed, so two
//! generators built from the same seed agree everywhere.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

const F3: f32 = 1.0 / 3.0;
const G3: f32 = 1.0 / 6.0;

#[derive(Clone)]
pub struct SimplexNoise {
    perm: [u8; 512],
}

impl SimplexNoise {
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255u8).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut perm = [0u8; 512];
        for (index, slot) in perm.iter_mut().enumerate() {
            *slot = table[index & 255];
        }
        Self { perm }
    }

    fn hash(&self, i: usize, j: usize, k: usize) -> &[f32; 3] {
        let inner = self.perm[k] as usize;
        let middle = self.perm[j + inner] as usize;
        let index = self.perm[i + middle] as usize;
        &GRAD3[index % 12]
    }

    /// Samples the noise field at `(x, y, z)`.
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        let skew = (x + y + z) * F3;
        let i = (x + skew).floor();
        let j = (y + skew).floor();
        let k = (z + skew).floor();

        let unskew = (i + j + k) * G3;
        let x0 = x - i + unskew;
        let y0 = y - j + unskew;
        let z0 = z - k + unskew;

        // Which of the six tetrahedra of the skewed cube holds the point.
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let offsets = [
            [x0, y0, z0],
            [
                x0 - i1 as f32 + G3,
                y0 - j1 as f32 + G3,
                z0 - k1 as f32 + G3,
            ],
            [
                x0 - i2 as f32 + 2.0 * G3,
                y0 - j2 as f32 + 2.0 * G3,
                z0 - k2 as f32 + 2.0 * G3,
            ],
            [x0 - 1.0 + 3.0 * G3, y0 - 1.0 + 3.0 * G3, z0 - 1.0 + 3.0 * G3],
        ];

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let kk = (k as i64 & 255) as usize;
        let gradients = [
            self.hash(ii, jj, kk),
            self.hash(ii + i1, jj + j1, kk + k1),
            self.hash(ii + i2, jj + j2, kk + k2),
            self.hash(ii + 1, jj + 1, kk + 1),
        ];

        let total: f32 = offsets
            .iter()
            .zip(gradients)
            .map(|(offset, gradient)| corner_contribution(*offset, gradient))
            .sum();

        (32.0 * total).clamp(-1.0, 1.0)
    }
}

fn corner_contribution(offset: [f32; 3], gradient: &[f32; 3]) -> f32 {
    let [x, y, z] = offset;
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        0.0
    } else {
        let t2 = t * t;
        t2 * t2 * (gradient[0] * x + gradient[1] * y + gradient[2] * z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_deterministic() {
        let a = SimplexNoise::new(7);
        let b = SimplexNoise::new(7);
        for step in 0..50 {
            let p = step as f32 * 0.37;
            assert_eq!(a.sample3(p, -p, p * 0.5), b.sample3(p, -p, p * 0.5));
        }
    }

    #[test]
    fn different_seeds_produce_different_fields() {
        let a = SimplexNoise::new(1);
        let b = SimplexNoise::new(2);
        let differs = (0..100).any(|step| {
            let p = step as f32 * 0.173 + 0.05;
            (a.sample3(p, p * 1.3, p * 0.7) - b.sample3(p, p * 1.3, p * 0.7)).abs() > 1e-4
        });
        assert!(differs);
    }

    #[test]
    fn output_is_bounded_and_continuous() {
        let noise = SimplexNoise::new(42);
        let mut previous = noise.sample3(0.0, 0.0, 0.0);
        for step in 1..2000 {
            let p = step as f32 * 0.001;
            let value = noise.sample3(p, p * 0.5, -p);
            assert!((-1.0..=1.0).contains(&value));
            assert!((value - previous).abs() < 0.1, "jump at step {step}");
            previous = value;
        }
    }

    #[test]
    fn lattice_origin_is_zero() {
        let noise = SimplexNoise::new(3);
        assert_eq!(noise.sample3(0.0, 0.0, 0.0), 0.0);
    }
}
