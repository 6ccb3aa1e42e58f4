use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

/// Direction or offset in world (or frame-local) space.
///
/// Serialized as a plain `[x, y, z]` array so configuration files and JS
/// payloads stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector along the X axis (world right).
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit vector along the Y axis (world up).
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit vector along the Z axis (world forward).
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Removes the component of `self` along `normal`.
    ///
    /// `normal` does not need to be unit length; a zero normal returns `self`.
    #[must_use]
    pub fn project_on_plane(self, normal: Self) -> Self {
        let n2 = normal.length_squared();
        if n2 <= 0.0 || !n2.is_finite() {
            return self;
        }
        self - normal.mul_scalar(self.dot(normal) / n2)
    }

    /// Unit direction of `self` projected onto the plane of `normal`.
    ///
    /// Returns `None` when `self` is zero or within `Tolerance::DIRECTION` of
    /// parallel to `normal`. The test is relative to `self`'s length, so a
    /// short but usable direction is kept.
    #[must_use]
    pub fn flattened_on(self, normal: Self) -> Option<Self> {
        let projected = self.project_on_plane(normal);
        if projected.length_squared() < Tolerance::DIRECTION.eps * self.length_squared() {
            return None;
        }
        projected.normalized()
    }

    /// Unit direction perpendicular to `self`, or `None` for a zero vector.
    ///
    /// Tries `self × X` first and `self × Z` when `self` is parallel to X.
    #[must_use]
    pub fn any_orthogonal(self) -> Option<Self> {
        let axis = self.normalized()?;
        let candidate = axis.cross(Self::X);
        if candidate.length_squared() > Tolerance::DIRECTION.eps {
            return candidate.normalized();
        }
        axis.cross(Self::Z).normalized()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs.mul_scalar(self)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// The origin point (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Position vector from the origin.
    #[must_use]
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[must_use]
    pub fn midpoint(self, rhs: Self) -> Self {
        Self::new(
            (self.x + rhs.x) * 0.5,
            (self.y + rhs.y) * 0.5,
            (self.z + rhs.z) * 0.5,
        )
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub<Vec3> for Point3 {
    type Output = Self;
    fn sub(self, rhs: Vec3) -> Self::Output {
        self.add_vec(-rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for geometric comparisons.
///
/// - `Tolerance::DEFAULT` - general comparisons (1e-9)
/// - `Tolerance::DIRECTION` - squared-length floor for a usable direction
///   after projection (1e-4)
/// - `Tolerance::ROUNDING` - tie window when rounding segment counts (1e-9)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// A projected direction whose squared length falls below this is
    /// treated as degenerate.
    pub const DIRECTION: Self = Self { eps: 1e-4 };

    pub const ROUNDING: Self = Self { eps: 1e-9 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        a.sub_point(b).length_squared() <= self.eps_squared()
    }

    #[must_use]
    pub fn approx_eq_vec3(self, a: Vec3, b: Vec3) -> bool {
        (a - b).length_squared() <= self.eps_squared()
    }

    /// Rounds `value` half up, treating anything within `eps` below a `.5`
    /// boundary as sitting on it.
    #[must_use]
    pub fn round_half_up(self, value: f64) -> f64 {
        (value + 0.5 + self.eps).floor()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operators() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(2.0 * a, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a / 2.0, Vec3::new(0.5, 1.0, 1.5));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_cross_follows_up_forward_right_convention() {
        assert_eq!(Vec3::Y.cross(Vec3::Z), Vec3::X);
        assert_eq!(Vec3::Y.cross(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn test_project_on_plane() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.project_on_plane(Vec3::Y), Vec3::new(1.0, 0.0, 3.0));
        assert_eq!(v.project_on_plane(Vec3::new(0.0, 4.0, 0.0)), Vec3::new(1.0, 0.0, 3.0));
        assert_eq!(v.project_on_plane(Vec3::ZERO), v);
        assert_eq!(Vec3::Y.project_on_plane(Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_flattened_on_ignores_input_length() {
        let short = Vec3::new(0.0, 0.0, 0.005).flattened_on(Vec3::Y).unwrap();
        assert_eq!(short, Vec3::Z);
        let tilted = Vec3::new(0.0, -3.0, 4.0).flattened_on(Vec3::Y).unwrap();
        assert_eq!(tilted, Vec3::Z);
        assert!(Vec3::new(0.0, 2.0, 1e-3).flattened_on(Vec3::Y).is_none());
        assert!(Vec3::new(0.0, 1e-6, 0.0).flattened_on(Vec3::Y).is_none());
        assert!(Vec3::ZERO.flattened_on(Vec3::Y).is_none());
    }

    #[test]
    fn test_any_orthogonal() {
        let up = Vec3::Y.any_orthogonal().unwrap();
        assert!(up.dot(Vec3::Y).abs() < 1e-12);
        assert!((up.length() - 1.0).abs() < 1e-12);

        let x = Vec3::X.any_orthogonal().unwrap();
        assert!(x.dot(Vec3::X).abs() < 1e-12);
        assert!((x.length() - 1.0).abs() < 1e-12);

        assert!(Vec3::ZERO.any_orthogonal().is_none());
    }

    #[test]
    fn test_point3_operators() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let v = Vec3::new(1.0, 1.0, 1.0);

        assert_eq!(p + v, Point3::new(2.0, 3.0, 4.0));
        assert_eq!(p - v, Point3::new(0.0, 1.0, 2.0));
        assert_eq!(Point3::new(4.0, 5.0, 6.0) - p, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(p.midpoint(Point3::new(3.0, 2.0, 1.0)), Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_round_half_up_absorbs_float_noise() {
        let tol = Tolerance::ROUNDING;
        assert_eq!(tol.round_half_up(3.5), 4.0);
        assert_eq!(tol.round_half_up(0.7 / 0.2), 4.0);
        assert_eq!(tol.round_half_up(2.5), 3.0);
        assert_eq!(tol.round_half_up(2.49), 2.0);
        assert_eq!(tol.round_half_up(0.0), 0.0);
    }

    #[test]
    fn test_serde_uses_arrays() {
        let v: Vec3 = serde_json::from_str("[0.0, 0.0, 0.05]").unwrap();
        assert_eq!(v, Vec3::new(0.0, 0.0, 0.05));
        assert_eq!(serde_json::to_string(&Point3::new(1.0, 2.0, 3.0)).unwrap(), "[1.0,2.0,3.0]");
    }
}
