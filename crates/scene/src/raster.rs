//! Depth-buffered software rasterizer for the cube tube.
//!
//! Cubes are drawn unlit in their flat color and blended toward the fog color
//! by view depth, matching a basic material under linear-range fog.

use glam::{Mat4, Vec3, Vec4};

use crate::camera::Camera;
use crate::canvas::Frame;
use crate::color::Rgba;
use crate::tube::{Cube, Tube};

const CUBE_TRIANGLES: [[usize; 3]; 12] = [
    [0, 2, 6],
    [0, 6, 4],
    [1, 3, 7],
    [1, 7, 5],
    [0, 1, 5],
    [0, 5, 4],
    [2, 3, 7],
    [2, 7, 6],
    [0, 1, 3],
    [0, 3, 2],
    [4, 5, 7],
    [4, 7, 6],
];

/// Range fog: fully clear before `near`, fully `color` past `far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgba,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            near: 30.0,
            far: 150.0,
        }
    }
}

impl Fog {
    pub fn factor(&self, depth: f32) -> f32 {
        smoothstep(self.near, self.far, depth)
    }

    pub fn apply(&self, color: Rgba, depth: f32) -> Rgba {
        color.lerp(self.color, self.factor(depth))
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![f32::INFINITY; width as usize * height as usize],
        }
    }

    /// Clears to "infinitely far", reallocating when the size changed.
    pub fn reset(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.values = vec![f32::INFINITY; width as usize * height as usize];
        } else {
            self.values.fill(f32::INFINITY);
        }
    }

    /// Stores `depth` at `(x, y)` when it is nearer than what is there.
    pub fn test_and_set(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let index = y as usize * self.width as usize + x as usize;
        match self.values.get_mut(index) {
            Some(slot) if depth < *slot => {
                *slot = depth;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// What one [`TubeRasterizer::render`] call drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub drawn: usize,
    pub culled: usize,
}

#[derive(Debug, Clone)]
pub struct TubeRasterizer {
    fog: Fog,
    depth: DepthBuffer,
}

struct ScreenVertex {
    x: f32,
    y: f32,
    z: f32,
}

impl TubeRasterizer {
    pub fn new(fog: Fog) -> Self {
        Self {
            fog,
            depth: DepthBuffer::new(0, 0),
        }
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn render(&mut self, tube: &Tube, camera: &Camera, frame: &mut Frame) -> RasterStats {
        self.render_cubes(tube.cubes(), tube.cube_size(), camera, frame)
    }

    pub fn render_cubes(
        &mut self,
        cubes: &[Cube],
        cube_size: f32,
        camera: &Camera,
        frame: &mut Frame,
    ) -> RasterStats {
        frame.clear(self.fog.color);
        self.depth.reset(frame.width(), frame.height());

        let view_projection = camera.view_projection();
        let forward = camera.forward();
        let half = cube_size / 2.0;
        let bound = half * 3f32.sqrt();
        let mut stats = RasterStats::default();

        for cube in cubes {
            let depth = (cube.position - camera.position).dot(forward);
            if depth + bound < camera.near || depth - bound > camera.far {
                stats.culled += 1;
                continue;
            }

            let model = Mat4::from_rotation_translation(cube.rotation, cube.position);
            let corners = cube_corners(half).map(|corner| {
                view_projection * model * Vec4::new(corner.x, corner.y, corner.z, 1.0)
            });
            let color = self.fog.apply(cube.color, depth).with_alpha(1.0);

            for [a, b, c] in CUBE_TRIANGLES {
                let (Some(a), Some(b), Some(c)) = (
                    to_screen(corners[a], camera.near, frame),
                    to_screen(corners[b], camera.near, frame),
                    to_screen(corners[c], camera.near, frame),
                ) else {
                    continue;
                };
                self.fill_triangle(&a, &b, &c, color, frame);
            }
            stats.drawn += 1;
        }

        stats
    }

    fn fill_triangle(
        &mut self,
        a: &ScreenVertex,
        b: &ScreenVertex,
        c: &ScreenVertex,
        color: Rgba,
        frame: &mut Frame,
    ) {
        let area = edge(a, b, c.x, c.y);
        if area.abs() <= f32::EPSILON {
            return;
        }

        let max_x = frame.width() as f32 - 1.0;
        let max_y = frame.height() as f32 - 1.0;
        let x0 = a.x.min(b.x).min(c.x).floor().max(0.0);
        let y0 = a.y.min(b.y).min(c.y).floor().max(0.0);
        let x1 = a.x.max(b.x).max(c.x).ceil().min(max_x);
        let y1 = a.y.max(b.y).max(c.y).ceil().min(max_y);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in y0 as u32..=y1 as u32 {
            for x in x0 as u32..=x1 as u32 {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = w0 * a.z + w1 * b.z + w2 * c.z;
                if self.depth.test_and_set(x, y, z) {
                    frame.put(x, y, color);
                }
            }
        }
    }
}

fn cube_corners(half: f32) -> [Vec3; 8] {
    let mut corners = [Vec3::ZERO; 8];
    for (index, corner) in corners.iter_mut().enumerate() {
        let sign = |bit: usize| if index & bit == 0 { -half } else { half };
        *corner = Vec3::new(sign(1), sign(2), sign(4));
    }
    corners
}

/// Clip space to pixel coordinates. Vertices in front of the near plane are
/// rejected, which drops the whole triangle.
fn to_screen(clip: Vec4, near: f32, frame: &Frame) -> Option<ScreenVertex> {
    if clip.w < near {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(ScreenVertex {
        x: (ndc.x * 0.5 + 0.5) * frame.width() as f32,
        y: (0.5 - ndc.y * 0.5) * frame.height() as f32,
        z: ndc.z,
    })
}

fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn cube(position: Vec3, color: Rgba) -> Cube {
        Cube {
            position,
            hue: 0.0,
            color,
            rotation: Quat::IDENTITY,
            ring: 0,
        }
    }

    fn camera() -> Camera {
        let mut camera = Camera::perspective(45.0, 1.0, 0.1, 150.0);
        camera.look_at(Vec3::ZERO, Vec3::NEG_Z);
        camera
    }

    const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);

    #[test]
    fn smoothstep_fog_clamps_at_both_ends() {
        let fog = Fog::default();
        assert_eq!(fog.factor(10.0), 0.0);
        assert_eq!(fog.factor(200.0), 1.0);
        assert!((fog.factor(90.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn visible_cube_covers_screen_center() {
        let mut frame = Frame::new(64, 64);
        let mut raster = TubeRasterizer::new(Fog::default());
        let stats = raster.render_cubes(
            &[cube(Vec3::new(0.0, 0.0, -10.0), RED)],
            4.0,
            &camera(),
            &mut frame,
        );
        assert_eq!(stats, RasterStats { drawn: 1, culled: 0 });
        assert_eq!(frame.pixel(32, 32), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn cubes_behind_camera_or_past_far_plane_are_culled() {
        let mut frame = Frame::new(32, 32);
        let mut raster = TubeRasterizer::new(Fog::default());
        let stats = raster.render_cubes(
            &[
                cube(Vec3::new(0.0, 0.0, 10.0), RED),
                cube(Vec3::new(0.0, 0.0, -400.0), RED),
            ],
            4.0,
            &camera(),
            &mut frame,
        );
        assert_eq!(stats, RasterStats { drawn: 0, culled: 2 });
        assert!(frame.as_bytes().chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn nearer_cube_wins_depth_test() {
        let mut frame = Frame::new(64, 64);
        let mut raster = TubeRasterizer::new(Fog::default());
        raster.render_cubes(
            &[
                cube(Vec3::new(0.0, 0.0, -5.0), BLUE),
                cube(Vec3::new(0.0, 0.0, -20.0), RED),
            ],
            4.0,
            &camera(),
            &mut frame,
        );
        assert_eq!(frame.pixel(32, 32), Some([0, 0, 255, 255]));
        assert!(raster.depth().get(32, 32).is_some_and(f32::is_finite));
    }

    #[test]
    fn distant_cubes_fade_into_fog() {
        let mut near_frame = Frame::new(64, 64);
        let mut far_frame = Frame::new(64, 64);
        let mut raster = TubeRasterizer::new(Fog::default());
        raster.render_cubes(&[cube(Vec3::new(0.0, 0.0, -20.0), RED)], 4.0, &camera(), &mut near_frame);
        raster.render_cubes(&[cube(Vec3::new(0.0, 0.0, -120.0), RED)], 4.0, &camera(), &mut far_frame);
        let near = near_frame.pixel(32, 32).unwrap()[0];
        let far = far_frame.pixel(32, 32).unwrap()[0];
        assert_eq!(near, 255);
        assert!(far < near / 2, "far {far}");
    }
}
