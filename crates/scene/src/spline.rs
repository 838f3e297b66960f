//! Centripetal Catmull-Rom paths with arc-length sampling and
//! parallel-transport frames.

use glam::{Quat, Vec3};

use crate::error::SceneError;

/// Number of divisions used to build the arc-length lookup table.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

/// Knot intervals shorter than this are treated as degenerate.
const MIN_KNOT_INTERVAL: f32 = 1e-4;

/// Orthonormal frame at one sample along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenetFrame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Smooth curve through an ordered list of control points.
///
/// `point` uses the raw curve parameter; `point_at` and `tangent_at` are
/// parametrized by arc length, so equal steps of `u` travel equal distances.
#[derive(Debug, Clone)]
pub struct CatmullRomPath {
    points: Vec<Vec3>,
    closed: bool,
    lengths: Vec<f32>,
}

impl CatmullRomPath {
    pub fn new(points: Vec<Vec3>, closed: bool) -> Result<Self, SceneError> {
        if points.len() < 2 {
            return Err(SceneError::TooFewControlPoints {
                found: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|point| !point.is_finite()) {
            return Err(SceneError::NonFiniteControlPoint { index });
        }

        let mut path = Self {
            points,
            closed,
            lengths: Vec::new(),
        };
        path.lengths = path.cumulative_lengths(ARC_LENGTH_DIVISIONS);
        Ok(path)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Approximate total arc length.
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Position at curve parameter `t`. Closed paths wrap `t` modulo 1.
    pub fn point(&self, t: f32) -> Vec3 {
        let (poly, weight) = self.segment(t);
        poly.eval(weight)
    }

    /// Position at arc-length fraction `u`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length fraction `u`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.u_to_t(u);
        let (poly, weight) = self.segment(t);
        let tangent = poly.derivative(weight).normalize_or_zero();
        if tangent != Vec3::ZERO {
            return tangent;
        }

        // Stationary point of the polynomial; fall back to a central difference.
        let delta = 1e-4;
        let ahead = self.point(t + delta);
        let behind = self.point(t - delta);
        let fallback = (ahead - behind).normalize_or_zero();
        if fallback == Vec3::ZERO {
            Vec3::X
        } else {
            fallback
        }
    }

    /// Maps an arc-length fraction onto the curve parameter.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let u = self.wrap(u);
        let total = self.length();
        let last = self.lengths.len() - 1;
        if total <= 0.0 || last == 0 {
            return u;
        }

        let target = u * total;
        let upper = self.lengths.partition_point(|&length| length < target);
        if upper == 0 {
            return 0.0;
        }
        if upper > last {
            return 1.0;
        }

        let lower = upper - 1;
        let before = self.lengths[lower];
        let span = self.lengths[upper] - before;
        let fraction = if span > 0.0 {
            (target - before) / span
        } else {
            0.0
        };
        (lower as f32 + fraction) / last as f32
    }

    /// Computes `segments + 1` parallel-transport frames, evenly spaced by arc
    /// length. Closed paths spread the accumulated twist so that the last
    /// frame lines up with the first.
    pub fn frenet_frames(&self, segments: usize) -> Result<Vec<FrenetFrame>, SceneError> {
        if segments == 0 {
            return Err(SceneError::invalid(
                "frame segments",
                "at least one segment is required",
            ));
        }

        let tangents: Vec<Vec3> = (0..=segments)
            .map(|index| self.tangent_at(index as f32 / segments as f32))
            .collect();

        let first = tangents[0];
        let seed_axis = smallest_axis(first);
        let side = first.cross(seed_axis).normalize();

        let mut normals = vec![Vec3::ZERO; segments + 1];
        let mut binormals = vec![Vec3::ZERO; segments + 1];
        normals[0] = first.cross(side);
        binormals[0] = first.cross(normals[0]);

        for index in 1..=segments {
            let mut normal = normals[index - 1];
            let axis = tangents[index - 1].cross(tangents[index]);
            if axis.length() > f32::EPSILON {
                let theta = tangents[index - 1]
                    .dot(tangents[index])
                    .clamp(-1.0, 1.0)
                    .acos();
                normal = Quat::from_axis_angle(axis.normalize(), theta) * normal;
            }
            normals[index] = normal;
            binormals[index] = tangents[index].cross(normal);
        }

        if self.closed {
            let mut theta = normals[0]
                .dot(normals[segments])
                .clamp(-1.0, 1.0)
                .acos()
                / segments as f32;
            if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
                theta = -theta;
            }
            for index in 1..=segments {
                normals[index] =
                    Quat::from_axis_angle(tangents[index], theta * index as f32) * normals[index];
                binormals[index] = tangents[index].cross(normals[index]);
            }
        }

        Ok(tangents
            .into_iter()
            .zip(normals)
            .zip(binormals)
            .map(|((tangent, normal), binormal)| FrenetFrame {
                tangent,
                normal,
                binormal,
            })
            .collect())
    }

    fn wrap(&self, t: f32) -> f32 {
        if self.closed {
            let wrapped = t.rem_euclid(1.0);
            if wrapped >= 1.0 {
                0.0
            } else {
                wrapped
            }
        } else {
            t.clamp(0.0, 1.0)
        }
    }

    fn segment(&self, t: f32) -> (CubicPoly, f32) {
        let t = self.wrap(t);
        let count = self.points.len();
        let spans = if self.closed { count } else { count - 1 };
        let scaled = spans as f32 * t;
        let mut index = scaled.floor() as usize;
        let mut weight = scaled - index as f32;

        if !self.closed && index >= count - 1 {
            index = count - 2;
            weight = 1.0;
        }

        let p1 = self.points[index % count];
        let p2 = self.points[(index + 1) % count];
        let p0 = if self.closed {
            self.points[(index + count - 1) % count]
        } else if index > 0 {
            self.points[index - 1]
        } else {
            2.0 * p1 - p2
        };
        let p3 = if self.closed {
            self.points[(index + 2) % count]
        } else if index + 2 < count {
            self.points[index + 2]
        } else {
            2.0 * p2 - p1
        };

        (CubicPoly::centripetal(p0, p1, p2, p3), weight)
    }

    fn cumulative_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for step in 1..=divisions {
            let current = self.point_raw(step as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    /// Like `point`, but `t = 1` on a closed path lands on the closing point
    /// instead of wrapping back to the start.
    fn point_raw(&self, t: f32) -> Vec3 {
        if self.closed && t >= 1.0 {
            self.points[0]
        } else {
            self.point(t)
        }
    }
}

fn smallest_axis(tangent: Vec3) -> Vec3 {
    let abs = tangent.abs();
    let mut min = f32::MAX;
    let mut axis = Vec3::X;
    if abs.x <= min {
        min = abs.x;
        axis = Vec3::X;
    }
    if abs.y <= min {
        min = abs.y;
        axis = Vec3::Y;
    }
    if abs.z <= min {
        axis = Vec3::Z;
    }
    axis
}

/// Cubic Hermite segment `c0 + c1 w + c2 w² + c3 w³`.
#[derive(Debug, Clone, Copy)]
struct CubicPoly {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl CubicPoly {
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);

        if dt1 < MIN_KNOT_INTERVAL {
            dt1 = 1.0;
        }
        if dt0 < MIN_KNOT_INTERVAL {
            dt0 = dt1;
        }
        if dt2 < MIN_KNOT_INTERVAL {
            dt2 = dt1;
        }

        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;
        Self::hermite(p1, p2, t1, t2)
    }

    fn eval(&self, w: f32) -> Vec3 {
        let w2 = w * w;
        self.c0 + self.c1 * w + self.c2 * w2 + self.c3 * (w2 * w)
    }

    fn derivative(&self, w: f32) -> Vec3 {
        self.c1 + 2.0 * self.c2 * w + 3.0 * self.c3 * (w * w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> CatmullRomPath {
        CatmullRomPath::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 2.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 3.0, 10.0),
            ],
            true,
        )
        .unwrap()
    }

    fn assert_close(a: Vec3, b: Vec3, tolerance: f32) {
        assert!(a.distance(b) < tolerance, "{a:?} != {b:?}");
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert_eq!(
            CatmullRomPath::new(vec![Vec3::ZERO], true).unwrap_err(),
            SceneError::TooFewControlPoints { found: 1 }
        );
        assert_eq!(
            CatmullRomPath::new(vec![Vec3::ZERO, Vec3::splat(f32::NAN)], false).unwrap_err(),
            SceneError::NonFiniteControlPoint { index: 1 }
        );
    }

    #[test]
    fn closed_path_wraps_parameter() {
        let path = square();
        for step in 0..20 {
            let t = step as f32 / 20.0;
            assert_close(path.point(t), path.point(t + 1.0), 1e-3);
            assert_close(path.point_at(t), path.point_at(t + 1.0), 1e-3);
            assert_close(path.point_at(t), path.point_at(t - 1.0), 1e-3);
        }
    }

    #[test]
    fn passes_through_control_points() {
        let path = square();
        let count = path.control_points().len();
        for (index, expected) in path.control_points().iter().enumerate() {
            let t = index as f32 / count as f32;
            assert_close(path.point(t), *expected, 1e-3);
        }
    }

    #[test]
    fn stays_near_control_hull() {
        let path = square();
        let min = Vec3::new(-5.0, -5.0, -5.0);
        let max = Vec3::new(15.0, 8.0, 15.0);
        for step in 0..=400 {
            let point = path.point_at(step as f32 / 400.0);
            assert!(point.cmpge(min).all() && point.cmple(max).all(), "{point:?}");
        }
    }

    #[test]
    fn arc_length_mapping_is_monotonic() {
        let path = square();
        let mut previous = 0.0;
        for step in 1..100 {
            let t = path.u_to_t(step as f32 / 100.0);
            assert!(t >= previous);
            previous = t;
        }
        assert!(path.length() > 40.0);
    }

    #[test]
    fn open_path_clamps_to_endpoints() {
        let path = CatmullRomPath::new(vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)], false).unwrap();
        assert_close(path.point(0.0), Vec3::ZERO, 1e-5);
        assert_close(path.point(1.0), Vec3::new(4.0, 0.0, 0.0), 1e-5);
        assert_close(path.point(2.0), Vec3::new(4.0, 0.0, 0.0), 1e-5);
        assert_close(path.point_at(0.5), Vec3::new(2.0, 0.0, 0.0), 1e-2);
    }

    #[test]
    fn frames_are_orthonormal() {
        let path = square();
        let frames = path.frenet_frames(64).unwrap();
        assert_eq!(frames.len(), 65);
        for frame in &frames {
            assert!((frame.tangent.length() - 1.0).abs() < 1e-3);
            assert!((frame.normal.length() - 1.0).abs() < 1e-3);
            assert!((frame.binormal.length() - 1.0).abs() < 1e-3);
            assert!(frame.tangent.dot(frame.normal).abs() < 1e-3);
            assert!(frame.tangent.dot(frame.binormal).abs() < 1e-3);
            assert!(frame.normal.dot(frame.binormal).abs() < 1e-3);
        }
    }

    #[test]
    fn closed_frames_line_up_at_the_seam() {
        let path = square();
        let frames = path.frenet_frames(128).unwrap();
        let first = frames[0];
        let last = frames[128];
        assert!(first.tangent.dot(last.tangent) > 0.999);
        assert!(first.normal.dot(last.normal) > 0.99);
    }

    #[test]
    fn zero_segments_is_an_error() {
        assert!(square().frenet_frames(0).is_err());
    }
}
