//! Two-dimensional vectors.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::util::{clamp, near_zero};

/// A 2D point or direction with `f64` components.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Vector2 {
        Vector2 { x, y }
    }

    #[inline]
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn dot(&self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product; positive when `other` is
    /// counter-clockwise from `self`.
    #[inline]
    pub fn cross(&self, other: Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn distance_squared(&self, other: Vector2) -> f64 {
        (*self - other).length_squared()
    }

    #[inline]
    pub fn distance(&self, other: Vector2) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Angle of this vector from the positive x axis, in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unsigned angle between two vectors, in `[0, π]`.  Zero if either
    /// vector has (near-)zero length.
    pub fn angle_with(&self, other: Vector2) -> f64 {
        let denominator = self.length() * other.length();
        if near_zero(denominator) {
            return 0.0;
        }

        clamp(self.dot(other) / denominator, -1.0, 1.0).acos()
    }

    /// Rotates counter-clockwise by `radians`.
    pub fn rotate(&self, radians: f64) -> Vector2 {
        let (sin, cos) = radians.sin_cos();
        self.rotate_precomputed(cos, sin)
    }

    /// Rotates by an angle whose cosine and sine were already computed.
    /// Useful inside loops which rotate many points by the same angle.
    #[inline]
    pub fn rotate_precomputed(&self, cos: f64, sin: f64) -> Vector2 {
        Vector2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Unit vector in the same direction, or zero if the length is near zero.
    pub fn normalize(&self) -> Vector2 {
        let len = self.length();
        if near_zero(len) {
            Vector2::ZERO
        } else {
            *self / len
        }
    }

    pub fn near_equals(&self, other: Vector2, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vector2) {
        *self = *self + rhs;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector2) {
        *self = *self - rhs;
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    #[inline]
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    #[inline]
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vector2> for f64 {
    type Output = Vector2;

    #[inline]
    fn mul(self, rhs: Vector2) -> Vector2 {
        rhs * self
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;

    #[inline]
    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use crate::util::near_equals;

    #[test]
    fn length_and_dot() {
        let v = Vector2::new(3.0, 4.0);
        assert_eq!(v.length_squared(), 25.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(v.dot(Vector2::new(2.0, 1.0)), 10.0);
    }

    #[test]
    fn cross_sign() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 1.0);
        assert!(x.cross(y) > 0.0);
        assert!(y.cross(x) < 0.0);
    }

    #[test]
    fn angles() {
        assert!(near_equals(Vector2::new(1.0, 1.0).angle(), FRAC_PI_4, 1e-12));
        assert!(near_equals(
            Vector2::new(1.0, 0.0).angle_with(Vector2::new(0.0, 1.0)),
            FRAC_PI_2,
            1e-12
        ));
        assert!(near_equals(
            Vector2::new(1.0, 0.0).angle_with(Vector2::new(-1.0, 0.0)),
            PI,
            1e-12
        ));
    }

    #[test]
    fn angle_with_zero_vector_is_zero() {
        assert_eq!(Vector2::new(1.0, 0.0).angle_with(Vector2::ZERO), 0.0);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vector2::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert!(v.near_equals(Vector2::new(0.0, 1.0), 1e-12));
    }

    #[test]
    fn normalize() {
        let v = Vector2::new(0.0, 5.0).normalize();
        assert!(v.near_equals(Vector2::new(0.0, 1.0), 1e-12));
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    }

    #[test]
    fn distance() {
        assert_eq!(Vector2::new(1.0, 1.0).distance(Vector2::new(4.0, 5.0)), 5.0);
    }
}
