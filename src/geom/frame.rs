//! Orthonormal frames and their quaternion export.
//!
//! Frames follow the look-rotation convention used by the host engines that
//! consume track layouts: local Z is the look direction, local Y is the
//! (re-orthogonalized) up reference and local X is `up × forward`. With world
//! up `+Y` and forward `+Z` this yields `+X` as right.

use serde::Serialize;

use super::core::{Point3, Tolerance, Vec3};

/// Origin plus three orthonormal axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub origin: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl Frame {
    /// World-aligned frame at `origin`.
    #[must_use]
    pub const fn world(origin: Point3) -> Self {
        Self {
            origin,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
        }
    }

    /// Frame looking along `forward` with `up` as the up reference.
    ///
    /// Returns `None` when `forward` is zero or parallel to `up`.
    #[must_use]
    pub fn look_rotation(origin: Point3, forward: Vec3, up: Vec3) -> Option<Self> {
        let z_axis = forward.normalized()?;
        let x_axis = up.cross(z_axis).normalized()?;
        let y_axis = z_axis.cross(x_axis);
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Post-multiplies a yaw of `degrees` about the frame's own Y axis.
    ///
    /// A positive angle turns local Z toward local X.
    #[must_use]
    pub fn rotated_about_local_y(self, degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            origin: self.origin,
            x_axis: self.x_axis * c - self.z_axis * s,
            y_axis: self.y_axis,
            z_axis: self.x_axis * s + self.z_axis * c,
        }
    }

    /// Maps a frame-local direction to world space.
    #[must_use]
    pub fn transform_direction(self, local: Vec3) -> Vec3 {
        self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    /// Maps a frame-local point to world space.
    #[must_use]
    pub fn transform_point(self, local: Point3) -> Point3 {
        self.origin + self.transform_direction(local.to_vec3())
    }

    #[must_use]
    pub fn is_orthonormal(self, tol: Tolerance) -> bool {
        let unit = |v: Vec3| tol.approx_eq_f64(v.length(), 1.0);
        unit(self.x_axis)
            && unit(self.y_axis)
            && unit(self.z_axis)
            && tol.approx_eq_f64(self.x_axis.dot(self.y_axis), 0.0)
            && tol.approx_eq_f64(self.y_axis.dot(self.z_axis), 0.0)
            && tol.approx_eq_f64(self.z_axis.dot(self.x_axis), 0.0)
    }

    /// Row-major 4x4 matrix with the axes as columns and the origin as
    /// translation.
    #[must_use]
    pub fn to_matrix(self) -> [[f64; 4]; 4] {
        let (x, y, z, o) = (self.x_axis, self.y_axis, self.z_axis, self.origin);
        [
            [x.x, y.x, z.x, o.x],
            [x.y, y.y, z.y, o.y],
            [x.z, y.z, z.z, o.z],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    #[must_use]
    pub fn to_quaternion(self) -> Quaternion {
        Quaternion::from_axes(self.x_axis, self.y_axis, self.z_axis)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Quaternion
// ─────────────────────────────────────────────────────────────────────────────

/// Unit rotation quaternion, `w` last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation taking the world axes onto `x_axis`, `y_axis`, `z_axis`.
    ///
    /// The axes must be orthonormal and right-handed in the `cross`
    /// sense (`x × y = z`).
    #[must_use]
    pub fn from_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let (m00, m01, m02) = (x_axis.x, y_axis.x, z_axis.x);
        let (m10, m11, m12) = (x_axis.y, y_axis.y, z_axis.y);
        let (m20, m21, m22) = (x_axis.z, y_axis.z, z_axis.z);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self {
                w: 0.25 * s,
                x: (m21 - m12) / s,
                y: (m02 - m20) / s,
                z: (m10 - m01) / s,
            }
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self {
                w: (m21 - m12) / s,
                x: 0.25 * s,
                y: (m01 + m10) / s,
                z: (m02 + m20) / s,
            }
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self {
                w: (m02 - m20) / s,
                x: (m01 + m10) / s,
                y: 0.25 * s,
                z: (m12 + m21) / s,
            }
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self {
                w: (m10 - m01) / s,
                x: (m02 + m20) / s,
                y: (m12 + m21) / s,
                z: 0.25 * s,
            }
        };
        q.normalized()
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len.is_finite() && len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
                w: self.w / len,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Rotates `v` by this quaternion.
    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}
