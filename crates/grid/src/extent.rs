use foundation::Sector;
use foundation::math::Cylinder;
use globe::GlobeStateKey;
use tracing::trace;
use view::DrawContext;

/// A bounding cylinder remembered for the exaggeration and globe state it
/// was computed under.
#[derive(Debug, Clone, Default)]
pub struct ExtentCache {
    entry: Option<(f64, GlobeStateKey, Cylinder)>,
}

impl ExtentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(&mut self, dc: &DrawContext<'_>, sector: &Sector) -> Cylinder {
        let ve = dc.vertical_exaggeration;
        let key = dc.globe.state_key();
        if let Some((cached_ve, cached_key, cylinder)) = &self.entry {
            if *cached_ve == ve && *cached_key == key {
                return *cylinder;
            }
        }
        trace!(%sector, ve, "extent rebuilt");
        let cylinder = dc.globe.bounding_cylinder(sector, ve);
        self.entry = Some((ve, key, cylinder));
        cylinder
    }

    /// Whether the sector's extent meets the view frustum.
    pub fn intersects_frustum(&mut self, dc: &DrawContext<'_>, sector: &Sector) -> bool {
        let cylinder = self.extent(dc, sector);
        dc.view.frustum().intersects_cylinder(&cylinder)
    }

    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
