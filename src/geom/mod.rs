mod core;
mod curve;
mod frame;

pub use core::{Point3, Tolerance, Vec3};
pub use curve::{Curve3, Line3, QuadraticBezier3, has_duplicate_neighbors, polyline_length};
pub use frame::{Frame, Quaternion};

#[cfg(test)]
mod tests;
