use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::Serialize;

/// Logical-space 2D vector. Forces are built from polar form, positions and
/// velocities are stored cartesian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

pub const fn vector2(x: f64, y: f64) -> Vector2 {
    Vector2 { x, y }
}

impl Vector2 {
    pub const ZERO: Self = vector2(0.0, 0.0);

    /// `angle` is in radians, measured from the +x axis.
    pub fn from_polar(magnitude: f64, angle: f64) -> Self {
        vector2(magnitude * angle.cos(), magnitude * angle.sin())
    }

    pub fn magnitude(self) -> f64 {
        self.magnitude_sq().sqrt()
    }

    pub fn magnitude_sq(self) -> f64 {
        (self.x * self.x) + (self.y * self.y)
    }

    /// Direction in radians, normalized to `[0, TAU)`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x).rem_euclid(TAU)
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    /// Same direction, magnitude limited to `max`.
    pub fn clamp_magnitude(self, max: f64) -> Self {
        let magnitude_sq = self.magnitude_sq();
        if magnitude_sq > max * max {
            self * (max / magnitude_sq.sqrt())
        } else {
            self
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        vector2(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        vector2(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        vector2(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        vector2(-self.x, -self.y)
    }
}

/// Axis-aligned box around a point set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Vector2,
    pub max: Vector2,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = Vector2>) -> Option<Self> {
        let mut min = vector2(f64::INFINITY, f64::INFINITY);
        let mut max = vector2(f64::NEG_INFINITY, f64::NEG_INFINITY);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        Some(Self { min, max })
    }

    pub fn width(self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    /// Factor that fits the box into a `viewport_width` x `viewport_height`
    /// viewport. Degenerate boxes scale by 1.
    pub fn fit_scale(self, viewport_width: f64, viewport_height: f64) -> f64 {
        let extent = self.width().max(self.height());
        if extent <= f64::EPSILON || !extent.is_finite() {
            return 1.0;
        }
        viewport_width.min(viewport_height) / extent
    }
}
