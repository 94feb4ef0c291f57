use foundation::math::PathType;
use foundation::{LatLon, Position, Sector};
use tracing::trace;
use view::DrawContext;

use crate::config::GridConfig;
use crate::element::{ElementKind, GraticuleStyle, GridElement, Renderable, surface_line};
use crate::extent::ExtentCache;
use crate::labels::LabelAnchors;
use crate::square::{SquareZone, squares_for_zone};
use crate::zone::ZoneIndex;

/// One MGRS grid zone: its boundary, its label and, lazily, its squares.
#[derive(Debug)]
pub struct GridZone {
    index: ZoneIndex,
    sector: Sector,
    extent: ExtentCache,
    visible: bool,
    elements: Option<Vec<GridElement>>,
    squares: Option<Vec<SquareZone>>,
}

impl GridZone {
    pub fn new(index: ZoneIndex) -> Self {
        Self {
            index,
            sector: index.sector(),
            extent: ExtentCache::new(),
            visible: false,
            elements: None,
            squares: None,
        }
    }

    pub fn index(&self) -> ZoneIndex {
        self.index
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    pub fn name(&self) -> String {
        self.index.name()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_elements(&self) -> bool {
        self.elements.is_some()
    }

    pub fn squares(&self) -> Option<&[SquareZone]> {
        self.squares.as_deref()
    }

    /// Drops the boundary elements and every square.
    pub fn release(&mut self) {
        self.visible = false;
        self.elements = None;
        self.squares = None;
    }

    /// Releases square renderables but keeps the squares themselves.
    pub fn release_square_renderables(&mut self) {
        if let Some(squares) = &mut self.squares {
            for square in squares {
                square.release();
            }
        }
    }

    pub(crate) fn update_visibility(&mut self, dc: &DrawContext<'_>) -> bool {
        self.visible = self.extent.intersects_frustum(dc, &self.sector);
        if !self.visible {
            self.release();
        }
        self.visible
    }

    fn build_elements(index: ZoneIndex, sector: &Sector, config: &GridConfig) -> Vec<GridElement> {
        let [sw, se, ne, nw] = sector.corners();
        let edge = |a: LatLon, b: LatLon, kind: ElementKind, side: Sector| {
            GridElement::polyline(
                side,
                kind,
                surface_line(a, b, PathType::Linear, config.terrain_conformance),
            )
        };
        let (s, n) = (sector.min_latitude(), sector.max_latitude());
        let (w, e) = (sector.min_longitude(), sector.max_longitude());
        vec![
            edge(sw, se, ElementKind::LineSouth, Sector::new(s, s, w, e)),
            edge(se, ne, ElementKind::LineEast, Sector::new(s, n, e, e)),
            edge(nw, ne, ElementKind::LineNorth, Sector::new(n, n, w, e)),
            edge(sw, nw, ElementKind::LineWest, Sector::new(s, n, w, w)),
            GridElement::label(
                ElementKind::ZoneLabel,
                index.name(),
                Position::from_lat_lon(sector.centroid(), 0.0),
            ),
        ]
    }

    fn north_piece(sector: &Sector, west: f64, east: f64, config: &GridConfig) -> GridElement {
        let lat = sector.max_latitude().degrees();
        GridElement::polyline(
            Sector::from_degrees(lat, lat, west, east),
            ElementKind::LineNorth,
            surface_line(
                LatLon::from_degrees(lat, west),
                LatLon::from_degrees(lat, east),
                PathType::Linear,
                config.terrain_conformance,
            ),
        )
    }

    /// Emits the zone boundary and label. Returns whether the elements had
    /// to be built.
    ///
    /// `north_covered` holds the longitude spans, in degrees, of visible
    /// zones to the north; their southern edges stand in for that part of
    /// this zone's northern edge.
    pub(crate) fn select(
        &mut self,
        dc: &DrawContext<'_>,
        config: &GridConfig,
        north_covered: &[(f64, f64)],
        east_visible: bool,
        out: &mut Vec<Renderable>,
    ) -> bool {
        let sector = self.sector;
        let built = self.elements.is_none();
        let elements = self
            .elements
            .get_or_insert_with(|| Self::build_elements(self.index, &sector, config));
        if built {
            trace!(zone = %self.index, "zone elements built");
        }
        let mut emit = |element: GridElement| {
            if dc.is_sector_visible(&element.sector) {
                out.push(Renderable {
                    element,
                    style: GraticuleStyle::GridZone,
                });
            }
        };
        for element in elements.iter() {
            match element.kind {
                ElementKind::LineNorth if !north_covered.is_empty() => {
                    let west = sector.min_longitude().degrees();
                    let east = sector.max_longitude().degrees();
                    for (lo, hi) in uncovered_spans(west, east, north_covered) {
                        emit(Self::north_piece(&sector, lo, hi, config));
                    }
                }
                ElementKind::LineEast if east_visible => {}
                ElementKind::ZoneLabel if !config.show_labels => {}
                _ => emit(element.clone()),
            }
        }
        built
    }

    /// Emits the visible 100 km squares and their grids.
    ///
    /// Visibility of every square is settled before any is emitted so that
    /// a shared edge is drawn once whatever the square order.
    pub(crate) fn select_squares(
        &mut self,
        dc: &DrawContext<'_>,
        config: &GridConfig,
        anchors: Option<LabelAnchors>,
        out: &mut Vec<Renderable>,
    ) {
        let index = self.index;
        let squares = self
            .squares
            .get_or_insert_with(|| squares_for_zone(dc.globe, index));
        for square in squares.iter_mut() {
            square.update_visibility(dc, config);
        }
        let visible: Vec<bool> = squares.iter().map(SquareZone::is_visible).collect();
        for square in squares.iter_mut().filter(|s| s.is_visible()) {
            let north = square.north_neighbor.is_some_and(|i| visible[i]);
            let east = square.east_neighbor.is_some_and(|i| visible[i]);
            square.select(dc, config, north, east, anchors, out);
        }
    }
}

/// Parts of `west..east` outside every span in `covered`.
fn uncovered_spans(west: f64, east: f64, covered: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut covered = covered.to_vec();
    covered.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut spans = Vec::new();
    let mut cursor = west;
    for (lo, hi) in covered {
        if cursor >= east {
            break;
        }
        if lo > cursor {
            spans.push((cursor, lo.min(east)));
        }
        cursor = cursor.max(hi);
    }
    if cursor < east {
        spans.push((cursor, east));
    }
    spans
}
