use foundation::Position;
use foundation::math::{Cylinder, Line, PathType, Vec3};
use view::DrawContext;

use crate::subdivision::interpolate;

/// Whether any of the segment `a..b` may be on screen.
///
/// Visible when an endpoint or the path midpoint is inside the frustum, or
/// when the cylinder from `a` to `b` with radius equal to the midpoint's
/// distance from the chord intersects the frustum.
pub fn is_segment_visible(
    dc: &DrawContext<'_>,
    a: &Position,
    b: &Position,
    path_type: PathType,
) -> bool {
    let frustum = dc.view.frustum();
    let pa = dc.globe.point_from(a);
    let pb = dc.globe.point_from(b);
    if frustum.contains(pa) || frustum.contains(pb) {
        return true;
    }
    let mid = dc.globe.point_from(&interpolate(0.5, a, b, path_type));
    if frustum.contains(mid) {
        return true;
    }
    if pa == pb {
        return false;
    }
    frustum.intersects_cylinder(&chord_cylinder(pa, pb, mid))
}

/// Cylinder along the chord `a..b` wide enough to hold the bulge at `mid`.
pub fn chord_cylinder(a: Vec3, b: Vec3, mid: Vec3) -> Cylinder {
    let radius = Line::from_segment(a, b).distance_to(mid);
    Cylinder::new(a, b, radius)
}
