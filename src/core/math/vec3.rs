/// A 3D vector
use serde::{Deserialize, Serialize};

use crate::core::{EPSILON, Float};

const TOL: Float = (1 as Float) * EPSILON;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "[Float; 3]", from = "[Float; 3]")]
pub struct Vec3 {
    e: [Float; 3],
}

/// Required to serialize Vec3 directly into an array instead of a JSON Object.
impl From<Vec3> for [Float; 3] {
    fn from(val: Vec3) -> Self {
        val.e
    }
}

impl From<[Float; 3]> for Vec3 {
    fn from(e: [Float; 3]) -> Self {
        Self { e }
    }
}

impl Vec3 {
    pub const fn new(e0: Float, e1: Float, e2: Float) -> Self {
        Self { e: [e0, e1, e2] }
    }

    pub fn x(&self) -> Float {
        self.e[0]
    }

    pub fn y(&self) -> Float {
        self.e[1]
    }

    pub fn z(&self) -> Float {
        self.e[2]
    }

    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> Float {
        self.e.iter().map(|e| e * e).sum()
    }

    /// Create a vector with a length of 1.0 in the same direction as the
    /// original vector.
    ///
    /// If the vector has a length of 0.0, the original vector is returned
    /// instead of a Result type. This is to avoid the overhead of unwrapping
    /// the Result type in the calling code.
    pub fn normalize(&self) -> Self {
        let length = self.length();

        if length == 0.0 {
            return *self;
        }

        Self::new(self.e[0] / length, self.e[1] / length, self.e[2] / length)
    }

    pub fn is_unit(&self) -> bool {
        (self.length_squared() - 1.0).abs() / Float::max(1.0, self.length_squared()) < TOL
    }

    pub fn dot(&self, rhs: Self) -> Float {
        self.e[0] * rhs.e[0] + self.e[1] * rhs.e[1] + self.e[2] * rhs.e[2]
    }

    pub fn cross(&self, rhs: Self) -> Self {
        Self::new(
            self.e[1] * rhs.e[2] - rhs.e[1] * self.e[2],
            -(self.e[0] * rhs.e[2] - rhs.e[0] * self.e[2]),
            self.e[0] * rhs.e[1] - rhs.e[0] * self.e[1],
        )
    }

    /// The component of this vector perpendicular to `axis`.
    ///
    /// `axis` must be a unit vector.
    pub fn reject(&self, axis: Self) -> Self {
        *self - axis * self.dot(axis)
    }
}

impl PartialEq for Vec3 {
    fn eq(&self, rhs: &Self) -> bool {
        (self.e[0] - rhs.e[0]) * (self.e[0] - rhs.e[0])
            + (self.e[1] - rhs.e[1]) * (self.e[1] - rhs.e[1])
            + (self.e[2] - rhs.e[2]) * (self.e[2] - rhs.e[2])
            < TOL * TOL
    }
}

impl std::ops::Add<Vec3> for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.e[0] + rhs.e[0],
            self.e[1] + rhs.e[1],
            self.e[2] + rhs.e[2],
        )
    }
}

impl std::ops::AddAssign<Vec3> for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        self.e[0] += rhs.e[0];
        self.e[1] += rhs.e[1];
        self.e[2] += rhs.e[2];
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.e[0], -self.e[1], -self.e[2])
    }
}

impl std::ops::Sub<Vec3> for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.e[0] - rhs.e[0],
            self.e[1] - rhs.e[1],
            self.e[2] - rhs.e[2],
        )
    }
}

impl std::ops::Mul<Float> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self::new(self.e[0] * rhs, self.e[1] * rhs, self.e[2] * rhs)
    }
}

impl std::ops::Div<Float> for Vec3 {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self::new(self.e[0] / rhs, self.e[1] / rhs, self.e[2] / rhs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize() {
        let v = Vec3::new(1.0, 1.0, 1.0);
        let norm = v.normalize();

        assert_ne!(v.length(), 1.0);
        assert_eq!(norm.length(), 1.0);
    }

    #[test]
    fn test_normalize_zero_length() {
        let v = Vec3::new(0.0, 0.0, 0.0);
        let norm = v.normalize();

        assert_eq!(norm.length(), 0.0);
    }

    #[test]
    fn test_cross_follows_right_hand_rule() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);

        assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_cross_of_parallel_vectors_is_zero() {
        let v = Vec3::new(1.0, 2.0, 3.0);

        assert_eq!(v.cross(v * 2.5), Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_reject_removes_axis_component() {
        let v = Vec3::new(3.0, 4.0, 5.0);
        let axis = Vec3::new(0.0, 0.0, 1.0);

        let rejected = v.reject(axis);

        assert_eq!(rejected, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(rejected.dot(axis), 0.0);
    }
}
