use foundation::math::{self, PathType};
use foundation::{Angle, Position};
use serde::{Deserialize, Serialize};
use tracing::warn;
use view::DrawContext;

pub const DEFAULT_NUM_SUBSEGMENTS: usize = 10;
pub const DEFAULT_TERRAIN_CONFORMANCE: f64 = 10.0;

/// Upper bound on samples per segment under terrain following.
const MAX_TERRAIN_SAMPLES: usize = 10_000;

/// How a segment between two positions is broken into sample points.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SubdivisionPolicy {
    /// Sample roughly every `terrain_conformance` pixels and drape the
    /// samples on the terrain.
    FollowTerrain { terrain_conformance: f64 },
    /// `num_subsegments` equal steps; elevations interpolate linearly.
    Fixed { num_subsegments: usize },
}

impl Default for SubdivisionPolicy {
    fn default() -> Self {
        SubdivisionPolicy::Fixed {
            num_subsegments: DEFAULT_NUM_SUBSEGMENTS,
        }
    }
}

/// Position at fraction `t` from `a` to `b`.
///
/// The horizontal location follows `path_type`; elevation is always linear.
/// `t` is clamped to `[0, 1]` and the endpoints come back exactly.
pub fn interpolate(t: f64, a: &Position, b: &Position, path_type: PathType) -> Position {
    let location = math::interpolate(path_type, t, a.lat_lon(), b.lat_lon());
    let elevation = if t <= 0.0 {
        a.elevation
    } else if t >= 1.0 {
        b.elevation
    } else {
        a.elevation + t * (b.elevation - a.elevation)
    };
    Position::from_lat_lon(location, elevation)
}

/// Arc length of the segment on the globe in meters.
pub fn segment_length(dc: &DrawContext<'_>, a: &Position, b: &Position, path_type: PathType) -> f64 {
    let angle = math::distance(path_type, a.lat_lon(), b.lat_lon());
    let mid_lat = Angle::average(a.latitude, b.latitude);
    angle.radians() * dc.globe.radius_at(mid_lat)
}

fn draped(dc: &DrawContext<'_>, p: Position) -> Position {
    let h = dc.globe.elevation(p.latitude, p.longitude) * dc.vertical_exaggeration;
    Position::new(p.latitude, p.longitude, h)
}

/// Sample positions along the segment `a..b`, both endpoints included.
pub fn generate_subdivision(
    dc: &DrawContext<'_>,
    a: &Position,
    b: &Position,
    path_type: PathType,
    policy: SubdivisionPolicy,
) -> Vec<Position> {
    match policy {
        SubdivisionPolicy::Fixed { num_subsegments } => {
            assert!(num_subsegments > 0, "a segment needs at least one subsegment");
            (0..=num_subsegments)
                .map(|i| {
                    if i == num_subsegments {
                        *b
                    } else {
                        interpolate(i as f64 / num_subsegments as f64, a, b, path_type)
                    }
                })
                .collect()
        }
        SubdivisionPolicy::FollowTerrain {
            terrain_conformance,
        } => {
            assert!(
                terrain_conformance > 0.0,
                "terrain conformance must be positive"
            );
            let start = draped(dc, *a);
            let end = draped(dc, *b);
            let arc_length = segment_length(dc, a, b, path_type);
            if arc_length <= 0.0 {
                return vec![start, end];
            }

            let mut out = vec![start];
            let mut t = 0.0;
            loop {
                let current = out[out.len() - 1];
                let point = dc.globe.point_from(&current);
                let pixel = dc.pixel_size_at(point);
                let step = (terrain_conformance * pixel / arc_length).max(1.0 / MAX_TERRAIN_SAMPLES as f64);
                t += step;
                if t >= 1.0 {
                    break;
                }
                if out.len() >= MAX_TERRAIN_SAMPLES {
                    warn!(arc_length, "terrain subdivision hit the sample cap");
                    break;
                }
                out.push(draped(dc, interpolate(t, a, b, path_type)));
            }
            out.push(end);
            out
        }
    }
}
