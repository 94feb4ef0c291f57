//! Placement of zone-number and scale labels relative to the view centre.

use foundation::{Angle, LatLon, normalized_degrees_longitude};
use view::DrawContext;

use crate::config::GridConfig;

/// Zone numbers whose labels are hidden north of [`SUPPRESSED_LABEL_LATITUDE`],
/// where the Svalbard zones swallow them.
const SVALBARD_MISSING_ZONES: [u8; 3] = [32, 34, 36];
pub const SUPPRESSED_LABEL_LATITUDE: f64 = 72.0;

/// Where labels go for the current view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelAnchors {
    /// Latitude of zone-number and easting labels.
    pub latitude: Angle,
    /// Longitude of northing labels.
    pub longitude: Angle,
}

impl LabelAnchors {
    /// `None` when the view has no centre on the globe.
    pub fn for_view(dc: &DrawContext<'_>, config: &GridConfig) -> Option<Self> {
        let center = dc.view.center_position()?;
        let offset = label_offset(dc, config, center.lat_lon());
        let latitude = (center.latitude - offset).clamp(
            Angle::from_degrees(config.label_min_latitude),
            Angle::from_degrees(config.label_max_latitude),
        );
        let longitude =
            Angle::from_degrees(normalized_degrees_longitude((center.longitude - offset).degrees()));
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// `label_offset_px` pixels at the view centre as an angle on the globe.
pub fn label_offset(dc: &DrawContext<'_>, config: &GridConfig, center: LatLon) -> Angle {
    let point = dc.surface_point_at(center);
    let pixel = dc.pixel_size_at(point);
    let radius = dc.globe.radius_at(center.latitude);
    Angle::from_radians(config.label_offset_px * pixel / radius)
}

/// Zones 32, 34 and 36 have no X band, so their labels vanish up there.
pub fn is_zone_label_suppressed(zone: u8, label_latitude: Angle) -> bool {
    label_latitude.degrees() > SUPPRESSED_LABEL_LATITUDE && SVALBARD_MISSING_ZONES.contains(&zone)
}

/// Text for an easting or northing scale label.
pub fn scale_label_text(value_m: f64, suffix: char) -> String {
    let value = value_m.round() as i64;
    if value % 1000 == 0 {
        format!("{}km{suffix}", value / 1000)
    } else {
        format!("{value}m{suffix}")
    }
}
