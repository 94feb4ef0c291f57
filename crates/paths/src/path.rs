use foundation::Position;
use foundation::math::{PathType, Vec3};
use tracing::trace;
use view::DrawContext;

use crate::culling::is_segment_visible;
use crate::subdivision::{SubdivisionPolicy, generate_subdivision};

/// A polyline over the globe between successive positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub positions: Vec<Position>,
    pub path_type: PathType,
    pub policy: SubdivisionPolicy,
}

impl Path {
    pub fn new(positions: Vec<Position>, path_type: PathType, policy: SubdivisionPolicy) -> Self {
        Self {
            positions,
            path_type,
            policy,
        }
    }

    /// Great-circle path with the default subdivision.
    pub fn from_positions(positions: Vec<Position>) -> Self {
        Self::new(positions, PathType::default(), SubdivisionPolicy::default())
    }

    pub fn segment_count(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Render points for every visible run of segments.
    ///
    /// Consecutive visible segments join into one run; a culled segment ends
    /// the current run. Runs always hold at least two points.
    pub fn tessellate(&self, dc: &DrawContext<'_>) -> Vec<Vec<Vec3>> {
        let mut runs = Vec::new();
        let mut current: Vec<Vec3> = Vec::new();
        for pair in self.positions.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if !is_segment_visible(dc, a, b, self.path_type) {
                if current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                continue;
            }
            let samples = generate_subdivision(dc, a, b, self.path_type, self.policy);
            let skip = usize::from(!current.is_empty());
            current.extend(samples.iter().skip(skip).map(|p| dc.globe.point_from(p)));
        }
        if current.len() >= 2 {
            runs.push(current);
        }
        trace!(
            segments = self.segment_count(),
            runs = runs.len(),
            "path tessellated"
        );
        runs
    }
}
