use foundation::math::PathType;
use foundation::{Angle, LatLon, Position, Sector};
use tracing::trace;
use view::DrawContext;

use crate::config::GridConfig;
use crate::element::{ElementKind, GraticuleStyle, GridElement, Renderable, surface_line};
use crate::labels::{LabelAnchors, is_zone_label_suppressed};
use crate::utm::{UTM_MAX_LATITUDE, UTM_MIN_LATITUDE, central_meridian_degrees};
use crate::zone::ZoneIndex;

/// Longitude span of one parallel segment.
const PARALLEL_SEGMENT_DEGREES: f64 = 30.0;

/// The coarse UTM graticule drawn from far away: zone meridians, band
/// parallels and zone numbers.
#[derive(Debug, Default)]
pub struct UtmGraticule {
    lines: Option<Vec<GridElement>>,
}

impl UtmGraticule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zone west edges merged into continuous north-south runs.
    pub fn meridian_runs() -> Vec<(f64, f64, f64)> {
        let mut edges: Vec<(f64, f64, f64)> = ZoneIndex::all()
            .map(|z| {
                let s = z.sector();
                (
                    s.min_longitude().degrees(),
                    s.min_latitude().degrees(),
                    s.max_latitude().degrees(),
                )
            })
            .collect();
        edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut runs: Vec<(f64, f64, f64)> = Vec::new();
        for (lon, south, north) in edges {
            match runs.last_mut() {
                Some(run) if run.0 == lon && run.2 == south => run.2 = north,
                _ => runs.push((lon, south, north)),
            }
        }
        runs
    }

    /// Band boundary latitudes, -80 through 84.
    pub fn parallel_latitudes() -> Vec<f64> {
        (0..20)
            .map(|i| UTM_MIN_LATITUDE + 8.0 * i as f64)
            .chain(std::iter::once(UTM_MAX_LATITUDE))
            .collect()
    }

    fn build_lines(config: &GridConfig) -> Vec<GridElement> {
        let mut lines = Vec::new();
        for (lon, south, north) in Self::meridian_runs() {
            let a = LatLon::from_degrees(south, lon);
            let b = LatLon::from_degrees(north, lon);
            lines.push(GridElement::polyline(
                Sector::from_degrees(south, north, lon, lon),
                ElementKind::Meridian,
                surface_line(a, b, PathType::Linear, config.terrain_conformance),
            ));
        }
        let segments = (360.0 / PARALLEL_SEGMENT_DEGREES) as usize;
        for lat in Self::parallel_latitudes() {
            for i in 0..segments {
                let west = -180.0 + PARALLEL_SEGMENT_DEGREES * i as f64;
                let east = west + PARALLEL_SEGMENT_DEGREES;
                lines.push(GridElement::polyline(
                    Sector::from_degrees(lat, lat, west, east),
                    ElementKind::Parallel,
                    surface_line(
                        LatLon::from_degrees(lat, west),
                        LatLon::from_degrees(lat, east),
                        PathType::Linear,
                        config.terrain_conformance,
                    ),
                ));
            }
        }
        trace!(count = lines.len(), "graticule lines built");
        lines
    }

    fn zone_labels(anchors: LabelAnchors) -> impl Iterator<Item = GridElement> {
        (1..=60u8)
            .filter(move |&zone| !is_zone_label_suppressed(zone, anchors.latitude))
            .map(move |zone| {
                GridElement::label(
                    ElementKind::ZoneLabel,
                    zone.to_string(),
                    Position::new(anchors.latitude, Angle::from_degrees(central_meridian_degrees(zone)), 0.0),
                )
            })
    }

    pub(crate) fn select(
        &mut self,
        dc: &DrawContext<'_>,
        config: &GridConfig,
        anchors: Option<LabelAnchors>,
        out: &mut Vec<Renderable>,
    ) {
        let lines = self.lines.get_or_insert_with(|| Self::build_lines(config));
        let mut emit = |element: GridElement| {
            if dc.is_sector_visible(&element.sector) {
                out.push(Renderable {
                    element,
                    style: GraticuleStyle::UtmGraticule,
                });
            }
        };
        for line in lines.iter() {
            emit(line.clone());
        }
        if let Some(anchors) = anchors.filter(|_| config.show_labels) {
            for label in Self::zone_labels(anchors) {
                emit(label);
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines = None;
    }
}

#[cfg(test)]
mod tests {
    use super::UtmGraticule;
    use crate::labels::LabelAnchors;
    use foundation::Angle;

    #[test]
    fn meridian_runs_follow_irregular_zones() {
        let runs = UtmGraticule::meridian_runs();
        assert_eq!(runs.len(), 65);
        let at = |lon: f64| -> Vec<(f64, f64)> {
            runs.iter()
                .filter(|r| r.0 == lon)
                .map(|r| (r.1, r.2))
                .collect()
        };
        assert_eq!(at(0.0), vec![(-80.0, 84.0)]);
        assert_eq!(at(3.0), vec![(56.0, 64.0)]);
        assert_eq!(at(6.0), vec![(-80.0, 56.0), (64.0, 72.0)]);
        assert_eq!(at(12.0), vec![(-80.0, 72.0)]);
        assert_eq!(at(9.0), vec![(72.0, 84.0)]);
        assert_eq!(at(42.0), vec![(-80.0, 84.0)]);
    }

    #[test]
    fn parallels_cover_every_band_edge() {
        let lats = UtmGraticule::parallel_latitudes();
        assert_eq!(lats.len(), 21);
        assert_eq!(lats[0], -80.0);
        assert_eq!(lats[19], 72.0);
        assert_eq!(lats[20], 84.0);
    }

    #[test]
    fn high_latitude_labels_skip_missing_zones() {
        let anchors = LabelAnchors {
            latitude: Angle::from_degrees(75.0),
            longitude: Angle::ZERO,
        };
        let names: Vec<String> = UtmGraticule::zone_labels(anchors)
            .filter_map(|e| e.label_text().map(str::to_string))
            .collect();
        assert_eq!(names.len(), 57);
        assert!(names.contains(&"33".to_string()));
        assert!(!names.contains(&"32".to_string()));
        assert!(!names.contains(&"36".to_string()));
    }
}
