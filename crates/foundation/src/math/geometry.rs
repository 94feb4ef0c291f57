use super::Vec3;

/// An infinite line `origin + t * direction`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Line {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        assert!(
            direction.length_squared() > 0.0,
            "line direction must be non-zero"
        );
        Self { origin, direction }
    }

    /// The line through two distinct points, directed from `a` to `b`.
    pub fn from_segment(a: Vec3, b: Vec3) -> Self {
        Self::new(a, b - a)
    }

    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn nearest_point_to(&self, p: Vec3) -> Vec3 {
        let t = (p - self.origin).dot(self.direction) / self.direction.length_squared();
        self.point_at(t)
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_to(&self, p: Vec3) -> f64 {
        p.distance_to(self.nearest_point_to(p))
    }
}

/// A plane `n·p + d = 0`; `distance` is signed and positive on the normal side.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub n: Vec3,
    pub d: f64,
}

impl Plane {
    pub fn new(n: Vec3, d: f64) -> Self {
        Self { n, d }
    }

    /// The plane through `point` with the given normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self::new(normal, -normal.dot(point)).normalize()
    }

    pub fn normalize(self) -> Self {
        let l2 = self.n.length_squared();
        if l2 <= 0.0 {
            return self;
        }
        let inv = 1.0 / l2.sqrt();
        Self {
            n: self.n * inv,
            d: self.d * inv,
        }
    }

    pub fn distance(&self, p: Vec3) -> f64 {
        self.n.dot(p) + self.d
    }

    /// Parameter `t` where `line` crosses the plane, `None` when parallel.
    pub fn intersect_line(&self, line: &Line) -> Option<f64> {
        let denom = self.n.dot(line.direction);
        if denom.abs() < 1e-12 {
            return None;
        }
        Some(-self.distance(line.origin) / denom)
    }
}

/// A right circular cylinder used as a loose bounding volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cylinder {
    pub bottom_center: Vec3,
    pub top_center: Vec3,
    pub radius: f64,
}

impl Cylinder {
    pub fn new(bottom_center: Vec3, top_center: Vec3, radius: f64) -> Self {
        assert!(radius >= 0.0, "cylinder radius must be non-negative");
        Self {
            bottom_center,
            top_center,
            radius,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.bottom_center.midpoint(self.top_center)
    }

    pub fn height(&self) -> f64 {
        self.bottom_center.distance_to(self.top_center)
    }

    pub fn axis_unit(&self) -> Option<Vec3> {
        (self.top_center - self.bottom_center).normalize()
    }

    /// Radius of the cylinder's projection onto a plane normal.
    pub fn effective_radius(&self, plane: &Plane) -> f64 {
        match self.axis_unit() {
            Some(axis) => {
                let c = plane.n.dot(axis);
                self.radius * (1.0 - c * c).max(0.0).sqrt()
            }
            None => self.radius,
        }
    }

    /// True when the cylinder lies entirely on the negative side of `plane`.
    pub fn is_behind(&self, plane: &Plane) -> bool {
        let r = self.effective_radius(plane);
        plane.distance(self.bottom_center) < -r && plane.distance(self.top_center) < -r
    }
}

#[cfg(test)]
mod tests {
    use super::{Cylinder, Line, Plane};
    use crate::math::Vec3;

    #[test]
    fn line_distance_is_perpendicular() {
        let line = Line::from_segment(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(line.distance_to(Vec3::new(5.0, 3.0, 4.0)), 5.0);
        assert_eq!(line.nearest_point_to(Vec3::new(-2.0, 1.0, 0.0)), Vec3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn plane_line_intersection() {
        let plane = Plane::new(Vec3::UNIT_Z, -100.0);
        let line = Line::new(Vec3::new(1.0, 2.0, 1000.0), Vec3::new(0.0, 0.0, -1.0));
        let t = plane.intersect_line(&line).unwrap();
        assert_eq!(line.point_at(t), Vec3::new(1.0, 2.0, 100.0));
        let parallel = Line::new(Vec3::ZERO, Vec3::UNIT_X);
        assert!(plane.intersect_line(&parallel).is_none());
    }

    #[test]
    fn cylinder_behind_plane() {
        let c = Cylinder::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0), 2.0);
        // x >= 5: the cylinder (|x| <= 2) is entirely outside.
        assert!(c.is_behind(&Plane::new(Vec3::UNIT_X, -5.0)));
        // x >= 1: partially inside.
        assert!(!c.is_behind(&Plane::new(Vec3::UNIT_X, -1.0)));
        assert_eq!(c.center(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(c.height(), 10.0);
    }
}
