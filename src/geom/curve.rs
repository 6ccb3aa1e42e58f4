use super::core::{Point3, Tolerance, Vec3};

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn derivative_at(&self, t: f64) -> Vec3;

    /// Returns the unit tangent vector at parameter `t`.
    /// Returns `None` if the derivative is zero or degenerate.
    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }

    /// `count` points at `t = k / (count + 1)` for `k` in `1..=count`.
    ///
    /// Both endpoints are excluded; `count == 0` yields nothing.
    #[must_use]
    fn interior_points(&self, count: usize) -> Vec<Point3> {
        let (a, b) = self.domain();
        let denom = (count + 1) as f64;
        (1..=count)
            .map(|k| self.point_at(a + (b - a) * (k as f64 / denom)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }

    /// Point `distance` along the line measured from `start`.
    ///
    /// A zero-length line returns `start` for every distance.
    #[must_use]
    pub fn point_at_distance(self, distance: f64) -> Point3 {
        match self.direction().normalized() {
            Some(dir) => self.start + dir * distance,
            None => self.start,
        }
    }
}

impl Curve3 for Line3 {
    fn point_at(&self, t: f64) -> Point3 {
        self.start.add_vec(self.direction().mul_scalar(t))
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.direction()
    }
}

/// Quadratic Bezier `(1-t)²·p0 + 2(1-t)t·p1 + t²·p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
}

impl QuadraticBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3) -> Self {
        Self { p0, p1, p2 }
    }
}

impl Curve3 for QuadraticBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        point_weighted_sum(self.p0, u * u, self.p1, 2.0 * u * t, self.p2, t * t)
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self.p1.sub_point(self.p0);
        let b = self.p2.sub_point(self.p1);
        a.mul_scalar(2.0 * u) + b.mul_scalar(2.0 * t)
    }
}

fn point_weighted_sum(a: Point3, wa: f64, b: Point3, wb: f64, c: Point3, wc: f64) -> Point3 {
    Point3::new(
        a.x * wa + b.x * wb + c.x * wc,
        a.y * wa + b.y * wb + c.y * wc,
        a.z * wa + b.z * wb + c.z * wc,
    )
}

/// Total length of an open polyline.
#[must_use]
pub fn polyline_length(points: &[Point3]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(pair[1]))
        .sum()
}

/// Whether two consecutive polyline points coincide anywhere in `points`.
#[must_use]
pub fn has_duplicate_neighbors(points: &[Point3], tol: Tolerance) -> bool {
    points
        .windows(2)
        .any(|pair| tol.approx_eq_point3(pair[0], pair[1]))
}
