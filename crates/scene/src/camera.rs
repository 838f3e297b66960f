use glam::{Mat4, Vec3};

use crate::spline::CatmullRomPath;

/// Right-handed perspective camera looking from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 400.0, 400.0),
            target: Vec3::ZERO,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Moves the camera to `position` facing `target`. A target that
    /// coincides with the position keeps the previous viewing direction.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        let direction = if position.distance_squared(target) > 1e-12 {
            target - position
        } else {
            self.forward()
        };
        self.position = position;
        self.target = position + direction;
    }

    pub fn forward(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            forward
        }
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        // look_at degenerates when looking straight up or down
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.position + forward, up)
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-6), self.near, self.far)
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Flies a camera along a path: one fixed step of progress per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    progress: f64,
    speed: f64,
    look_ahead: f32,
}

impl CameraRig {
    pub fn new(speed: f32, look_ahead: f32) -> Self {
        Self {
            progress: 0.0,
            speed: speed as f64,
            look_ahead,
        }
    }

    /// Total progress accumulated so far; grows without bound.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress folded into `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.progress.rem_euclid(1.0) as f32
    }

    pub fn advance(&mut self, path: &CatmullRomPath, camera: &mut Camera) {
        self.progress += self.speed;
        let phase = self.phase();
        let position = path.point_at(phase);
        let target = path.point_at(phase + self.look_ahead);
        camera.look_at(position, target);
    }
}
