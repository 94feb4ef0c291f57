//! 100 km MGRS squares and the recursive grids inside them.

use std::collections::HashMap;

use foundation::math::PathType;
use foundation::{Angle, LatLon, Position, Sector};
use globe::Globe;
use tracing::{debug, trace};
use view::DrawContext;

use crate::clip::truncated_segment;
use crate::config::GridConfig;
use crate::element::{ElementKind, GraticuleStyle, GridElement, Renderable, surface_line};
use crate::extent::ExtentCache;
use crate::labels::{LabelAnchors, scale_label_text};
use crate::mgrs::square_id;
use crate::utm::{
    Hemisphere, MAX_EASTING, MAX_NORTHING, MIN_EASTING, UtmCoord, central_meridian_degrees,
    utm_to_lat_lon_unwrapped,
};
use crate::zone::ZoneIndex;

pub const SQUARE_SIZE_M: f64 = 100_000.0;
/// Smallest grid that still gets finer children; its own lines are 1 m apart.
pub const MIN_SUBDIVIDED_SIZE_M: f64 = 100.0;
const GRID_DIVISIONS: usize = 10;

/// Geometry shared by squares and grids: a UTM-aligned cell of one zone.
#[derive(Debug, Clone)]
pub struct SquareCell {
    pub zone: ZoneIndex,
    pub zone_sector: Sector,
    pub utm_zone: u8,
    pub hemisphere: Hemisphere,
    pub sw_easting: f64,
    pub sw_northing: f64,
    pub size: f64,
    /// SW, SE, NE, NW. Longitudes stay continuous across the antimeridian.
    pub corners: [LatLon; 4],
    /// Bounding sector of the corners, clipped to the zone.
    pub sector: Sector,
    /// Some corner lies outside the zone.
    pub truncated: bool,
    extent: ExtentCache,
}

impl SquareCell {
    /// `None` when the cell leaves the UTM domain or no corner is inside
    /// the zone.
    pub fn build(globe: &Globe, zone: ZoneIndex, sw_easting: f64, sw_northing: f64, size: f64) -> Option<Self> {
        assert!(size > 0.0, "cell size must be positive");
        let zone_sector = zone.sector();
        let utm_zone = zone.zone_number();
        let hemisphere = zone.hemisphere();

        let mut corners = [LatLon::ZERO; 4];
        let offsets = [(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)];
        for (corner, (de, dn)) in corners.iter_mut().zip(offsets) {
            match utm_to_lat_lon_unwrapped(utm_zone, hemisphere, sw_easting + de, sw_northing + dn, globe) {
                Ok((lat, lon)) => *corner = LatLon::new(lat, lon),
                Err(err) => {
                    debug!(zone = %zone, sw_easting, sw_northing, %err, "cell outside the UTM domain");
                    return None;
                }
            }
        }

        let inside = corners.iter().filter(|c| zone_sector.contains(**c)).count();
        if inside == 0 {
            trace!(zone = %zone, sw_easting, sw_northing, size, "cell outside its zone");
            return None;
        }
        let sector = Sector::bounding_sector(corners)?.intersection(&zone_sector)?;
        Some(Self {
            zone,
            zone_sector,
            utm_zone,
            hemisphere,
            sw_easting,
            sw_northing,
            size,
            corners,
            sector,
            truncated: inside < 4,
            extent: ExtentCache::new(),
        })
    }

    pub fn center(&self) -> LatLon {
        self.sector.centroid()
    }

    /// Cell size in screen pixels at its centre.
    pub fn size_in_pixels(&self, dc: &DrawContext<'_>) -> f64 {
        let point = dc.surface_point_at(self.center());
        self.size / dc.pixel_size_at(point)
    }

    pub fn is_in_view(&mut self, dc: &DrawContext<'_>) -> bool {
        self.extent.intersects_frustum(dc, &self.sector)
    }

    fn location(&self, globe: &Globe, easting: f64, northing: f64) -> Option<LatLon> {
        utm_to_lat_lon_unwrapped(self.utm_zone, self.hemisphere, easting, northing, globe)
            .ok()
            .map(|(lat, lon)| LatLon::new(lat, lon))
    }

    /// The part of `a..b` inside the zone.
    fn clipped(&self, a: LatLon, b: LatLon) -> Option<(LatLon, LatLon)> {
        if self.truncated {
            truncated_segment(a, b, &self.zone_sector)
        } else {
            Some((a, b))
        }
    }

    fn line(&self, a: LatLon, b: LatLon, kind: ElementKind, config: &GridConfig) -> Option<GridElement> {
        let (a, b) = self.clipped(a, b)?;
        Some(ground_line(a, b, kind, config))
    }

    fn key(&self) -> (i64, i64) {
        (
            (self.sw_easting / self.size).round() as i64,
            (self.sw_northing / self.size).round() as i64,
        )
    }
}

fn ground_line(a: LatLon, b: LatLon, kind: ElementKind, config: &GridConfig) -> GridElement {
    let (lat_a, lat_b) = (a.latitude.degrees(), b.latitude.degrees());
    let (lon_a, lon_b) = (a.longitude.degrees(), b.longitude.degrees());
    let sector = Sector::from_degrees(lat_a.min(lat_b), lat_a.max(lat_b), lon_a.min(lon_b), lon_a.max(lon_b));
    GridElement::polyline(
        sector,
        kind,
        surface_line(a, b, PathType::GreatCircle, config.terrain_conformance),
    )
}

/// A 100 km square of one grid zone.
#[derive(Debug)]
pub struct SquareZone {
    pub cell: SquareCell,
    /// Two-letter MGRS square identifier.
    pub id: String,
    pub north_neighbor: Option<usize>,
    pub east_neighbor: Option<usize>,
    visible: bool,
    size_px: f64,
    elements: Option<Vec<GridElement>>,
    grid: Option<SquareGrid>,
}

impl SquareZone {
    pub fn new(cell: SquareCell, id: String) -> Self {
        Self {
            cell,
            id,
            north_neighbor: None,
            east_neighbor: None,
            visible: false,
            size_px: 0.0,
            elements: None,
            grid: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_elements(&self) -> bool {
        self.elements.is_some()
    }

    pub fn grid(&self) -> Option<&SquareGrid> {
        self.grid.as_ref()
    }

    /// Drops cached renderables here and below, keeping the grid tree.
    pub fn release(&mut self) {
        self.elements = None;
        if let Some(grid) = &mut self.grid {
            grid.release();
        }
    }

    pub(crate) fn update_visibility(&mut self, dc: &DrawContext<'_>, config: &GridConfig) -> bool {
        self.visible = self.cell.is_in_view(dc) && {
            self.size_px = self.cell.size_in_pixels(dc);
            self.size_px > config.min_cell_size_px
        };
        if !self.visible {
            self.release();
        }
        self.visible
    }

    fn build_elements(cell: &SquareCell, id: &str, config: &GridConfig) -> Vec<GridElement> {
        let [sw, se, ne, nw] = cell.corners;
        let mut elements: Vec<GridElement> = [
            (sw, se, ElementKind::LineSouth),
            (se, ne, ElementKind::LineEast),
            (nw, ne, ElementKind::LineNorth),
            (sw, nw, ElementKind::LineWest),
        ]
        .into_iter()
        .filter_map(|(a, b, kind)| cell.line(a, b, kind, config))
        .collect();
        elements.push(GridElement::label(
            ElementKind::ZoneLabel,
            id,
            Position::from_lat_lon(cell.center(), 0.0),
        ));
        elements
    }

    /// Emits this square's boundary, skipping the north and east edges a
    /// visible neighbour draws as its south and west edges.
    pub(crate) fn select(
        &mut self,
        dc: &DrawContext<'_>,
        config: &GridConfig,
        north_visible: bool,
        east_visible: bool,
        anchors: Option<LabelAnchors>,
        out: &mut Vec<Renderable>,
    ) {
        let elements = self
            .elements
            .get_or_insert_with(|| Self::build_elements(&self.cell, &self.id, config));
        for element in elements.iter() {
            let skip = match element.kind {
                ElementKind::LineNorth => north_visible,
                ElementKind::LineEast => east_visible,
                ElementKind::ZoneLabel => !config.show_labels,
                _ => false,
            };
            if !skip && dc.is_sector_visible(&element.sector) {
                out.push(Renderable {
                    element: element.clone(),
                    style: GraticuleStyle::Square100Km,
                });
            }
        }

        if self.size_px > config.grid_consider_px() {
            let grid = self
                .grid
                .get_or_insert_with(|| SquareGrid::new(self.cell.clone()));
            grid.select(dc, config, anchors, out);
        } else if let Some(grid) = &mut self.grid {
            grid.release();
        }
    }
}

#[derive(Debug, Clone)]
struct GridLine {
    element: GridElement,
    value: f64,
    start: LatLon,
    end: LatLon,
}

/// Interior lines of a cell at a tenth of its size, with finer grids below.
#[derive(Debug)]
pub struct SquareGrid {
    pub cell: SquareCell,
    lines: Option<Vec<GridLine>>,
    children: Option<Vec<SquareGrid>>,
}

impl SquareGrid {
    pub fn new(cell: SquareCell) -> Self {
        Self {
            cell,
            lines: None,
            children: None,
        }
    }

    /// Distance between this grid's lines.
    pub fn spacing(&self) -> f64 {
        self.cell.size / GRID_DIVISIONS as f64
    }

    pub fn children(&self) -> Option<&[SquareGrid]> {
        self.children.as_deref()
    }

    pub fn release(&mut self) {
        self.lines = None;
        if let Some(children) = &mut self.children {
            for child in children {
                child.release();
            }
        }
    }

    fn build_lines(cell: &SquareCell, globe: &Globe, config: &GridConfig) -> Vec<GridLine> {
        let spacing = cell.size / GRID_DIVISIONS as f64;
        let (e0, n0) = (cell.sw_easting, cell.sw_northing);
        let mut lines = Vec::with_capacity(2 * (GRID_DIVISIONS - 1));
        for i in 1..GRID_DIVISIONS {
            let offset = i as f64 * spacing;
            let easting = (
                ElementKind::LineEasting,
                e0 + offset,
                (e0 + offset, n0),
                (e0 + offset, n0 + cell.size),
            );
            let northing = (
                ElementKind::LineNorthing,
                n0 + offset,
                (e0, n0 + offset),
                (e0 + cell.size, n0 + offset),
            );
            for (kind, value, (ea, na), (eb, nb)) in [easting, northing] {
                let (Some(a), Some(b)) = (cell.location(globe, ea, na), cell.location(globe, eb, nb)) else {
                    continue;
                };
                let Some((start, end)) = cell.clipped(a, b) else {
                    continue;
                };
                lines.push(GridLine {
                    element: ground_line(start, end, kind, config),
                    value,
                    start,
                    end,
                });
            }
        }
        lines
    }

    fn build_children(cell: &SquareCell, globe: &Globe) -> Vec<SquareGrid> {
        let spacing = cell.size / GRID_DIVISIONS as f64;
        let mut children = Vec::with_capacity(GRID_DIVISIONS * GRID_DIVISIONS);
        for i in 0..GRID_DIVISIONS {
            for j in 0..GRID_DIVISIONS {
                let e = cell.sw_easting + i as f64 * spacing;
                let n = cell.sw_northing + j as f64 * spacing;
                if let Some(child) = SquareCell::build(globe, cell.zone, e, n, spacing) {
                    children.push(SquareGrid::new(child));
                }
            }
        }
        trace!(zone = %cell.zone, size = spacing, count = children.len(), "sub-grids built");
        children
    }

    fn scale_label(line: &GridLine, anchors: LabelAnchors) -> Option<GridElement> {
        let (a, b) = (line.start, line.end);
        let (position, suffix) = match line.element.kind {
            ElementKind::LineEasting => {
                let lat = anchors.latitude.degrees();
                let (la, lb) = (a.latitude.degrees(), b.latitude.degrees());
                if lat < la.min(lb) || lat > la.max(lb) || la == lb {
                    return None;
                }
                let t = (lat - la) / (lb - la);
                let lon = Angle::mix(t, a.longitude, b.longitude);
                (LatLon::new(anchors.latitude, lon), 'E')
            }
            ElementKind::LineNorthing => {
                let lon = anchors.longitude.degrees();
                let (la, lb) = (a.longitude.degrees(), b.longitude.degrees());
                if lon < la.min(lb) || lon > la.max(lb) || la == lb {
                    return None;
                }
                let t = (lon - la) / (lb - la);
                let lat = Angle::mix(t, a.latitude, b.latitude);
                (LatLon::new(lat, anchors.longitude), 'N')
            }
            _ => return None,
        };
        Some(GridElement::label(
            ElementKind::ScaleLabel,
            scale_label_text(line.value, suffix),
            Position::from_lat_lon(position, 0.0),
        ))
    }

    pub(crate) fn select(
        &mut self,
        dc: &DrawContext<'_>,
        config: &GridConfig,
        anchors: Option<LabelAnchors>,
        out: &mut Vec<Renderable>,
    ) {
        if !self.cell.is_in_view(dc) {
            self.release();
            return;
        }
        let size_px = self.cell.size_in_pixels(dc);
        if size_px <= config.grid_visible_px() {
            self.release();
            return;
        }

        let style = GraticuleStyle::for_size(self.spacing());
        let lines = self
            .lines
            .get_or_insert_with(|| Self::build_lines(&self.cell, dc.globe, config));
        for line in lines.iter() {
            if dc.is_sector_visible(&line.element.sector) {
                out.push(Renderable {
                    element: line.element.clone(),
                    style,
                });
            }
        }
        if let Some(anchors) = anchors.filter(|_| config.show_labels && size_px > config.scale_label_px()) {
            for line in lines.iter() {
                if let Some(label) = Self::scale_label(line, anchors) {
                    if dc.is_sector_visible(&label.sector) {
                        out.push(Renderable {
                            element: label,
                            style,
                        });
                    }
                }
            }
        }

        if size_px > config.subgrid_px() && self.cell.size >= MIN_SUBDIVIDED_SIZE_M {
            let children = self
                .children
                .get_or_insert_with(|| Self::build_children(&self.cell, dc.globe));
            for child in children.iter_mut() {
                child.select(dc, config, anchors, out);
            }
        } else if let Some(children) = &mut self.children {
            for child in children {
                child.release();
            }
        }
    }
}

/// Forced-zone UTM bounds of a zone, sampled on its corners, edge
/// midpoints, centroid and central meridian.
fn zone_utm_bounds(globe: &Globe, zone: ZoneIndex) -> Option<(f64, f64, f64, f64)> {
    let sector = zone.sector();
    let (min_lat, max_lat) = (sector.min_latitude().degrees(), sector.max_latitude().degrees());
    let (min_lon, max_lon) = (sector.min_longitude().degrees(), sector.max_longitude().degrees());
    let cm = central_meridian_degrees(zone.zone_number());
    let lats = [min_lat, 0.5 * (min_lat + max_lat), max_lat];
    let mut lons = vec![min_lon, 0.5 * (min_lon + max_lon), max_lon];
    if (min_lon..=max_lon).contains(&cm) {
        lons.push(cm);
    }

    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for &lat in &lats {
        for &lon in &lons {
            let utm = match UtmCoord::from_lat_lon_in_zone(
                Angle::from_degrees(lat),
                Angle::from_degrees(lon),
                zone.zone_number(),
                zone.hemisphere(),
                globe,
            ) {
                Ok(utm) => utm,
                Err(err) => {
                    debug!(zone = %zone, lat, lon, %err, "zone bound sample skipped");
                    continue;
                }
            };
            let (e, n) = (utm.easting, utm.northing);
            bounds = Some(match bounds {
                None => (e, e, n, n),
                Some((e0, e1, n0, n1)) => (e0.min(e), e1.max(e), n0.min(n), n1.max(n)),
            });
        }
    }
    bounds
}

/// Every 100 km square overlapping `zone`, with north and east neighbour
/// indices filled in.
pub fn squares_for_zone(globe: &Globe, zone: ZoneIndex) -> Vec<SquareZone> {
    let Some((min_e, max_e, min_n, max_n)) = zone_utm_bounds(globe, zone) else {
        return Vec::new();
    };
    let first_e = ((min_e / SQUARE_SIZE_M).floor() * SQUARE_SIZE_M).max(MIN_EASTING);
    let first_n = ((min_n / SQUARE_SIZE_M).floor() * SQUARE_SIZE_M).max(0.0);

    let mut squares = Vec::new();
    let mut e = first_e;
    while e < max_e && e < MAX_EASTING {
        let mut n = first_n;
        while n < max_n && n < MAX_NORTHING {
            if let Some(cell) = SquareCell::build(globe, zone, e, n, SQUARE_SIZE_M) {
                match square_id(cell.utm_zone, e + SQUARE_SIZE_M / 2.0, n + SQUARE_SIZE_M / 2.0) {
                    Ok(id) => squares.push(SquareZone::new(cell, id)),
                    Err(err) => debug!(zone = %zone, e, n, %err, "square id unavailable"),
                }
            }
            n += SQUARE_SIZE_M;
        }
        e += SQUARE_SIZE_M;
    }

    let slots: HashMap<(i64, i64), usize> = squares
        .iter()
        .enumerate()
        .map(|(i, s)| (s.cell.key(), i))
        .collect();
    for square in &mut squares {
        let (x, y) = square.cell.key();
        square.north_neighbor = slots.get(&(x, y + 1)).copied();
        square.east_neighbor = slots.get(&(x + 1, y)).copied();
    }
    trace!(zone = %zone, count = squares.len(), "squares built");
    squares
}
