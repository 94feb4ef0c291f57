use std::collections::BTreeSet;
use std::sync::Arc;

use foundation::math::Vec3;
use foundation::{Angle, normalized_degrees_longitude};
use globe::GlobeStateKey;
use runtime::Metrics;
use tracing::debug;
use view::DrawContext;

use crate::config::GridConfig;
use crate::element::{Renderable, Selection};
use crate::graticule::UtmGraticule;
use crate::grid_zone::GridZone;
use crate::labels::LabelAnchors;
use crate::zone::{ZONE_CELLS, ZoneIndex, zones_for_sector};

/// The view state a selection was computed for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub eye_point: Vec3,
    pub altitude_above_ground: f64,
    pub heading: Option<Angle>,
    pub pitch: Option<Angle>,
    pub field_of_view: Angle,
    pub vertical_exaggeration: f64,
    pub globe_key: GlobeStateKey,
}

impl ViewSnapshot {
    pub fn capture(dc: &DrawContext<'_>) -> Self {
        Self {
            eye_point: dc.view.eye_point(),
            altitude_above_ground: dc.eye_altitude_above_ground(),
            heading: dc.view.heading(),
            pitch: dc.view.pitch(),
            field_of_view: dc.view.field_of_view(),
            vertical_exaggeration: dc.vertical_exaggeration,
            globe_key: dc.globe.state_key(),
        }
    }

    /// Why `current` needs a new selection, or `None` when this one still
    /// holds.
    pub fn change_reason(&self, current: &ViewSnapshot, config: &GridConfig) -> Option<&'static str> {
        let moved = self.eye_point.distance_to(current.eye_point);
        if moved > config.eye_move_fraction * self.altitude_above_ground.max(1.0) {
            return Some("eye moved");
        }
        if self.vertical_exaggeration != current.vertical_exaggeration {
            return Some("vertical exaggeration changed");
        }
        if self.globe_key != current.globe_key {
            return Some("globe changed");
        }
        let threshold = config.view_angle_threshold;
        if angle_changed(self.heading, current.heading, threshold) {
            return Some("heading changed");
        }
        if angle_changed(self.pitch, current.pitch, threshold) {
            return Some("pitch changed");
        }
        if angle_changed(Some(self.field_of_view), Some(current.field_of_view), threshold) {
            return Some("field of view changed");
        }
        None
    }
}

fn angle_changed(a: Option<Angle>, b: Option<Angle>, threshold_deg: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => normalized_degrees_longitude((a - b).degrees()).abs() > threshold_deg,
        (None, None) => false,
        _ => true,
    }
}

/// MGRS/UTM grid selection over a session.
///
/// Owns one slot per cell of the 60 × 20 zone grid; zones are created the
/// first time they come into view and then stay in their slot.
#[derive(Debug)]
pub struct GridLayer {
    config: GridConfig,
    zones: Vec<Option<GridZone>>,
    visible_slots: Vec<usize>,
    graticule: UtmGraticule,
    metrics: Metrics,
    last: Option<(ViewSnapshot, Arc<Selection>)>,
}

impl Default for GridLayer {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl GridLayer {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            zones: (0..ZONE_CELLS).map(|_| None).collect(),
            visible_slots: Vec::new(),
            graticule: UtmGraticule::new(),
            metrics: Metrics::new(),
            last: None,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Replaces the config and discards everything built with the old one.
    pub fn set_config(&mut self, config: GridConfig) {
        self.config = config;
        for zone in self.zones.iter_mut().flatten() {
            zone.release();
        }
        self.visible_slots.clear();
        self.graticule.clear();
        self.invalidate();
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn zone(&self, index: ZoneIndex) -> Option<&GridZone> {
        self.zones.get(index.slot())?.as_ref()
    }

    /// Forces the next call to [`GridLayer::select_visible`] to rebuild.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// The renderables for the current view.
    ///
    /// Returns the previous selection, pointer-identical, while the view has
    /// not changed enough to matter.
    pub fn select_visible(&mut self, dc: &DrawContext<'_>) -> Arc<Selection> {
        let snapshot = ViewSnapshot::capture(dc);
        if let Some((previous, selection)) = &self.last {
            match previous.change_reason(&snapshot, &self.config) {
                None => {
                    self.metrics.inc_counter("grid.cache_hits", 1);
                    return Arc::clone(selection);
                }
                Some(reason) => debug!(reason, frame = dc.frame.index, "grid selection rebuilt"),
            }
        }

        let renderables = self.build_selection(dc);
        self.metrics.inc_counter("grid.selections", 1);
        self.metrics
            .set_gauge("grid.renderables", renderables.len() as i64);
        let selection = Arc::new(Selection {
            frame: dc.frame.index,
            renderables,
        });
        self.last = Some((snapshot, Arc::clone(&selection)));
        selection
    }

    fn release_visible_zones(&mut self, keep: &BTreeSet<usize>) {
        for slot in std::mem::take(&mut self.visible_slots) {
            if keep.contains(&slot) {
                continue;
            }
            if let Some(zone) = self.zones[slot].as_mut() {
                debug!(zone = %zone.index(), "zone left view");
                zone.release();
            }
        }
    }

    fn build_selection(&mut self, dc: &DrawContext<'_>) -> Vec<Renderable> {
        let config = self.config.clone();
        let altitude = dc.view.eye_position().elevation;
        let anchors = if config.show_labels {
            LabelAnchors::for_view(dc, &config)
        } else {
            None
        };
        let mut out = Vec::new();

        if altitude > config.zone_max_altitude {
            self.release_visible_zones(&BTreeSet::new());
            self.graticule.select(dc, &config, anchors, &mut out);
            return out;
        }

        let candidates: BTreeSet<usize> = dc
            .visible_sectors
            .iter()
            .flat_map(zones_for_sector)
            .map(ZoneIndex::slot)
            .collect();
        self.release_visible_zones(&candidates);

        let mut visible = vec![false; ZONE_CELLS];
        for &slot in &candidates {
            let Some(index) = ZoneIndex::from_slot(slot) else {
                continue;
            };
            let zone = self.zones[slot].get_or_insert_with(|| GridZone::new(index));
            visible[slot] = zone.update_visibility(dc);
        }
        let visible_slots: Vec<usize> = candidates.into_iter().filter(|&s| visible[s]).collect();

        let show_squares = altitude <= config.square_max_altitude;
        for &slot in &visible_slots {
            let Some(zone) = self.zones[slot].as_mut() else {
                continue;
            };
            let index = zone.index();
            let north_covered: Vec<(f64, f64)> = index
                .north_neighbors()
                .into_iter()
                .filter(|n| visible[n.slot()])
                .map(|n| {
                    let s = n.sector();
                    (s.min_longitude().degrees(), s.max_longitude().degrees())
                })
                .collect();
            let east = index.east_neighbor().is_some_and(|n| visible[n.slot()]);
            if zone.select(dc, &config, &north_covered, east, &mut out) {
                self.metrics.inc_counter("grid.zones_built", 1);
            }
            if show_squares {
                zone.select_squares(dc, &config, anchors, &mut out);
            } else {
                zone.release_square_renderables();
            }
        }
        self.visible_slots = visible_slots;
        out
    }
}
