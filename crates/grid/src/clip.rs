//! Clipping of great-circle segments against sector edges.

use foundation::math::great_circle_midpoint;
use foundation::{Angle, LatLon, Sector, normalized_degrees_longitude};
use tracing::warn;

/// Bisection steps before giving up on an edge crossing.
pub const MAX_BISECTION_ITERATIONS: usize = 20;
/// Angular tolerance of an edge crossing, one meter on the equator.
pub const BISECTION_PRECISION_RADIANS: f64 = 1.0 / 6_378_137.0;

#[derive(Debug, Copy, Clone, PartialEq)]
enum Edge {
    West(f64),
    East(f64),
    South(f64),
    North(f64),
}

impl Edge {
    /// The first sector edge `p` lies beyond.
    fn violated_by(p: LatLon, sector: &Sector) -> Self {
        let lon = p.longitude.degrees();
        let lat = p.latitude.degrees();
        if lon > sector.max_longitude().degrees() {
            Edge::East(sector.max_longitude().degrees())
        } else if lon < sector.min_longitude().degrees() {
            Edge::West(sector.min_longitude().degrees())
        } else if lat > sector.max_latitude().degrees() {
            Edge::North(sector.max_latitude().degrees())
        } else {
            Edge::South(sector.min_latitude().degrees())
        }
    }

    /// Signed distance in degrees past the edge; positive is outside.
    fn overshoot(self, p: LatLon) -> f64 {
        match self {
            Edge::East(lon) => normalized_degrees_longitude(p.longitude.degrees() - lon),
            Edge::West(lon) => normalized_degrees_longitude(lon - p.longitude.degrees()),
            Edge::North(lat) => p.latitude.degrees() - lat,
            Edge::South(lat) => lat - p.latitude.degrees(),
        }
    }

    fn snap(self, p: LatLon) -> LatLon {
        match self {
            Edge::East(lon) | Edge::West(lon) => LatLon::new(p.latitude, Angle::from_degrees(lon)),
            Edge::North(lat) | Edge::South(lat) => LatLon::new(Angle::from_degrees(lat), p.longitude),
        }
    }
}

/// Point where the great circle from `inside` to `outside` crosses `edge`.
fn crossing(inside: LatLon, outside: LatLon, edge: Edge) -> LatLon {
    let mut lo = inside;
    let mut hi = outside;
    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = great_circle_midpoint(lo, hi);
        let overshoot = edge.overshoot(mid);
        if overshoot.abs().to_radians() <= BISECTION_PRECISION_RADIANS {
            return edge.snap(mid);
        }
        if overshoot > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    let best = great_circle_midpoint(lo, hi);
    warn!(
        ?edge,
        inside_lat = inside.latitude.degrees(),
        inside_lon = inside.longitude.degrees(),
        outside_lat = outside.latitude.degrees(),
        outside_lon = outside.longitude.degrees(),
        error_deg = edge.overshoot(best),
        "edge crossing did not converge"
    );
    edge.snap(best)
}

/// The part of segment `a..b` inside `sector`.
///
/// Returns the segment unchanged when both ends are inside and `None` when
/// both are outside. Otherwise the outside end is moved onto the sector
/// boundary, crossing at most four edges in turn.
pub fn truncated_segment(a: LatLon, b: LatLon, sector: &Sector) -> Option<(LatLon, LatLon)> {
    let a_inside = sector.contains(a);
    let b_inside = sector.contains(b);
    match (a_inside, b_inside) {
        (true, true) => return Some((a, b)),
        (false, false) => return None,
        _ => {}
    }
    let inside = if a_inside { a } else { b };
    let mut outside = if a_inside { b } else { a };
    for _ in 0..4 {
        if sector.contains(outside) {
            break;
        }
        outside = crossing(inside, outside, Edge::violated_by(outside, sector));
    }
    Some(if a_inside { (a, outside) } else { (outside, b) })
}
