use foundation::{LatLon, Position, Sector};
use paths::{Path, PathType, SubdivisionPolicy};
use serde::{Deserialize, Serialize};

/// What a grid element depicts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    LineWest,
    LineEast,
    LineNorth,
    LineSouth,
    LineEasting,
    LineNorthing,
    Meridian,
    Parallel,
    ZoneLabel,
    ScaleLabel,
}

impl ElementKind {
    pub fn is_label(self) -> bool {
        matches!(self, ElementKind::ZoneLabel | ElementKind::ScaleLabel)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polyline(Path),
    Label { text: String, position: Position },
}

/// One drawable piece of the grid with the sector it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct GridElement {
    pub sector: Sector,
    pub kind: ElementKind,
    pub primitive: Primitive,
}

impl GridElement {
    pub fn polyline(sector: Sector, kind: ElementKind, path: Path) -> Self {
        Self {
            sector,
            kind,
            primitive: Primitive::Polyline(path),
        }
    }

    pub fn label(kind: ElementKind, text: impl Into<String>, position: Position) -> Self {
        let location = position.lat_lon();
        Self {
            sector: Sector::new(
                location.latitude,
                location.latitude,
                location.longitude,
                location.longitude,
            ),
            kind,
            primitive: Primitive::Label {
                text: text.into(),
                position,
            },
        }
    }

    pub fn label_text(&self) -> Option<&str> {
        match &self.primitive {
            Primitive::Label { text, .. } => Some(text),
            Primitive::Polyline(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.primitive {
            Primitive::Polyline(path) => Some(path),
            Primitive::Label { .. } => None,
        }
    }
}

/// A two-point line on the ground that drapes over terrain.
pub fn surface_line(a: LatLon, b: LatLon, path_type: PathType, terrain_conformance: f64) -> Path {
    Path::new(
        vec![a.with_elevation(0.0), b.with_elevation(0.0)],
        path_type,
        SubdivisionPolicy::FollowTerrain {
            terrain_conformance,
        },
    )
}

/// Visual class of a renderable, from the coarse graticule down to the
/// 1 m grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraticuleStyle {
    UtmGraticule,
    GridZone,
    Square100Km,
    Square10Km,
    Square1Km,
    Square100M,
    Square10M,
    Square1M,
}

impl GraticuleStyle {
    /// Style for square or grid lines spaced `size_m` apart.
    pub fn for_size(size_m: f64) -> Self {
        if size_m >= 100_000.0 {
            GraticuleStyle::Square100Km
        } else if size_m >= 10_000.0 {
            GraticuleStyle::Square10Km
        } else if size_m >= 1_000.0 {
            GraticuleStyle::Square1Km
        } else if size_m >= 100.0 {
            GraticuleStyle::Square100M
        } else if size_m >= 10.0 {
            GraticuleStyle::Square10M
        } else {
            GraticuleStyle::Square1M
        }
    }

    /// RGBA line colour.
    pub fn line_color(self) -> [f32; 4] {
        match self {
            GraticuleStyle::UtmGraticule => [1.0, 1.0, 0.0, 1.0],
            GraticuleStyle::GridZone => [1.0, 1.0, 0.0, 1.0],
            GraticuleStyle::Square100Km => [0.0, 1.0, 0.0, 1.0],
            GraticuleStyle::Square10Km => [0.0, 0.4, 1.0, 1.0],
            GraticuleStyle::Square1Km => [0.0, 1.0, 1.0, 1.0],
            GraticuleStyle::Square100M => [0.0, 0.6, 0.6, 1.0],
            GraticuleStyle::Square10M => [0.0, 0.4, 0.4, 1.0],
            GraticuleStyle::Square1M => [0.0, 0.2, 0.2, 1.0],
        }
    }

    pub fn font_size_px(self) -> f32 {
        match self {
            GraticuleStyle::UtmGraticule | GraticuleStyle::GridZone => 16.0,
            GraticuleStyle::Square100Km => 14.0,
            _ => 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub element: GridElement,
    pub style: GraticuleStyle,
}

/// Ordered renderables produced by one selection pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub frame: u64,
    pub renderables: Vec<Renderable>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    pub fn count_of(&self, kind: ElementKind) -> usize {
        self.renderables
            .iter()
            .filter(|r| r.element.kind == kind)
            .count()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.renderables.iter().filter_map(|r| r.element.label_text())
    }
}
