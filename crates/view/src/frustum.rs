use foundation::math::{Cylinder, Plane, Vec3};

/// View frustum as 6 planes.
///
/// Convention:
/// - A point `p` is inside iff `plane.distance(p) >= 0` for all planes.
/// - Planes are in model space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frustum {
    pub left: Plane,
    pub right: Plane,
    pub bottom: Plane,
    pub top: Plane,
    pub near: Plane,
    pub far: Plane,
}

impl Frustum {
    pub fn new(
        left: Plane,
        right: Plane,
        bottom: Plane,
        top: Plane,
        near: Plane,
        far: Plane,
    ) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    pub fn normalize(self) -> Self {
        Self {
            left: self.left.normalize(),
            right: self.right.normalize(),
            bottom: self.bottom.normalize(),
            top: self.top.normalize(),
            near: self.near.normalize(),
            far: self.far.normalize(),
        }
    }

    pub fn planes(&self) -> [Plane; 6] {
        [
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        ]
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.planes().iter().all(|plane| plane.distance(p) >= 0.0)
    }

    /// Conservative test: false only when the cylinder lies wholly outside
    /// one of the planes.
    pub fn intersects_cylinder(&self, cylinder: &Cylinder) -> bool {
        !self
            .planes()
            .iter()
            .any(|plane| cylinder.is_behind(plane))
    }
}
