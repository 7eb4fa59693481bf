//! Pure trigonometric helpers shared by the simulator and the AI.
//!
//! Angles are in degrees throughout the public API, measured counter-clockwise
//! from the positive x axis, matching [`Shot::angle`](crate::Shot::angle).

use glam::DVec2;

/// Axis-aligned rectangle, used for the table bed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    #[must_use]
    pub const fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns `true` if `point` lies inside the rectangle, excluding the border.
    #[must_use]
    pub fn contains_strictly(&self, point: DVec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    /// Returns `true` if `point` lies inside the rectangle or on its border.
    #[must_use]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Distance along a ray from `origin` to the point where it leaves the rectangle.
    ///
    /// `direction` must be a unit vector. Returns `None` when the origin is outside the
    /// rectangle and the ray never enters it.
    ///
    /// ```
    /// use cueai_engine::geometry::Rect;
    /// use glam::DVec2;
    ///
    /// let rect = Rect::new(DVec2::ZERO, DVec2::new(4.0, 2.0));
    /// let exit = rect.ray_exit_distance(DVec2::new(1.0, 1.0), DVec2::X).unwrap();
    /// assert!((exit - 3.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn ray_exit_distance(&self, origin: DVec2, direction: DVec2) -> Option<f64> {
        let (enter, exit) = self.ray_slab(origin, direction)?;
        (exit >= enter.max(0.0)).then_some(exit.max(0.0))
    }

    /// Slab test returning the entry/exit distances along an infinite line.
    fn ray_slab(&self, origin: DVec2, direction: DVec2) -> Option<(f64, f64)> {
        let mut enter = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;
        for (o, d, lo, hi) in [
            (origin.x, direction.x, self.min.x, self.max.x),
            (origin.y, direction.y, self.min.y, self.max.y),
        ] {
            if d.abs() <= f64::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            enter = enter.max(t1.min(t2));
            exit = exit.min(t1.max(t2));
        }
        (enter <= exit).then_some((enter, exit))
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
///
/// ```
/// use cueai_engine::geometry::normalize_angle;
///
/// assert_eq!(normalize_angle(-90.0), 270.0);
/// assert_eq!(normalize_angle(360.0), 0.0);
/// assert_eq!(normalize_angle(725.0), 5.0);
/// ```
#[must_use]
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Smallest absolute difference between two angles, in `[0, 180]`.
#[must_use]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_angle(a - b);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Unit vector pointing along `degrees`.
#[must_use]
pub fn direction(degrees: f64) -> DVec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    DVec2::new(cos, sin)
}

/// Angle of the vector from `from` to `to`, in `[0, 360)`.
#[must_use]
pub fn angle_towards(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    normalize_angle(delta.y.atan2(delta.x).to_degrees())
}

/// Perpendicular distance from `center` to the ray starting at `origin`.
///
/// `direction` must be a unit vector. Returns `None` when the point lies behind the
/// origin (`u·v <= 0`), since such points can never be hit by the ray.
#[must_use]
pub fn ray_point_distance(origin: DVec2, direction: DVec2, center: DVec2) -> Option<f64> {
    let v = center - origin;
    let along = direction.dot(v);
    if along <= 0.0 {
        return None;
    }
    Some((v.length_squared() - along * along).max(0.0).sqrt())
}

/// Returns `true` if the ray passes within `radius` of `center`.
#[must_use]
pub fn ray_intersects_circle(origin: DVec2, direction: DVec2, center: DVec2, radius: f64) -> bool {
    ray_point_distance(origin, direction, center).is_some_and(|d| d <= radius)
}
