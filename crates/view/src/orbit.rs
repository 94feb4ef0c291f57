use core::f64::consts::PI;

use foundation::math::{Line, Plane, Vec3};
use foundation::{Angle, LatLon, Position, Sector, normalized_degrees_longitude};
use globe::Globe;
use tracing::trace;

use crate::frustum::Frustum;
use crate::view::{View, Viewport};

pub const DEFAULT_FIELD_OF_VIEW_DEGREES: f64 = 45.0;

/// Terrain height allowed for beyond the geometric horizon.
const HORIZON_TERRAIN_ALLOWANCE_M: f64 = 10_000.0;

/// Screen samples sampled for the surface footprint: center, corners, edges.
const FOOTPRINT_SAMPLES: [(f64, f64); 9] = [
    (0.0, 0.0),
    (-1.0, -1.0),
    (1.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (0.0, -1.0),
    (1.0, 0.0),
    (0.0, 1.0),
    (-1.0, 0.0),
];

/// Camera placement for an [`OrbitView`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitParams {
    /// Point the camera orbits and looks at.
    pub center: Position,
    /// Eye distance from `center` in meters.
    pub range: f64,
    /// Clockwise from north.
    pub heading: Angle,
    /// Zero looks straight down; ninety looks at the horizon.
    pub pitch: Angle,
    pub field_of_view: Angle,
    pub viewport: Viewport,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            center: Position::default(),
            range: 10_000_000.0,
            heading: Angle::ZERO,
            pitch: Angle::ZERO,
            field_of_view: Angle::from_degrees(DEFAULT_FIELD_OF_VIEW_DEGREES),
            viewport: Viewport::default(),
        }
    }
}

impl OrbitParams {
    pub fn looking_at(center: Position, range: f64) -> Self {
        Self {
            center,
            range,
            ..Self::default()
        }
    }

    pub fn with_heading(mut self, heading: Angle) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_pitch(mut self, pitch: Angle) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_field_of_view(mut self, field_of_view: Angle) -> Self {
        self.field_of_view = field_of_view;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }
}

/// A camera orbiting a point on the globe.
///
/// Derived state (eye point, frustum) is computed against a globe; call
/// [`OrbitView::set_params`] or [`OrbitView::update`] after the camera or
/// the globe's projection changes.
#[derive(Debug, Clone)]
pub struct OrbitView {
    params: OrbitParams,
    eye_point: Vec3,
    eye_position: Position,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    far_distance: f64,
    frustum: Frustum,
}

impl OrbitView {
    pub fn new(globe: &Globe, params: OrbitParams) -> Self {
        assert!(params.range > 0.0, "orbit range must be positive");
        let fov = params.field_of_view.degrees();
        assert!(fov > 0.0 && fov < 180.0, "field of view must be in (0, 180)");

        let c = params.center;
        let center_point = globe.point_from_position(c.latitude, c.longitude, c.elevation);
        let frame = globe.local_frame(c.latitude, c.longitude);
        let pitch = params
            .pitch
            .clamp(Angle::ZERO, Angle::from_degrees(89.999));
        let (sin_h, cos_h) = (params.heading.sin(), params.heading.cos());
        let (sin_p, cos_p) = (pitch.sin(), pitch.cos());

        let heading_dir = frame.north * cos_h + frame.east * sin_h;
        let back = frame.up * cos_p - heading_dir * sin_p;
        let eye_point = center_point + back * params.range;
        let forward = -back;
        let up = frame.up * sin_p + heading_dir * cos_p;
        let right = forward.cross(up);

        let eye_position = globe.compute_position_from_point(eye_point);
        let altitude = eye_position.elevation;
        let near_distance = (altitude * 0.05).clamp(1.0, 1.0e6);
        let far_distance = if globe.is_flat() {
            2.0 * PI * globe.equatorial_radius()
        } else {
            let horizon = globe.horizon_distance(altitude.max(0.0))
                + globe.horizon_distance(HORIZON_TERRAIN_ALLOWANCE_M);
            params.range.max(horizon) * 1.1 + 1000.0
        };

        let tan_x = params.field_of_view.tan_half_angle();
        let tan_y = tan_x / params.viewport.aspect();
        let frustum = Frustum::new(
            Plane::from_point_normal(eye_point, right + forward * tan_x),
            Plane::from_point_normal(eye_point, -right + forward * tan_x),
            Plane::from_point_normal(eye_point, up + forward * tan_y),
            Plane::from_point_normal(eye_point, -up + forward * tan_y),
            Plane::from_point_normal(eye_point + forward * near_distance, forward),
            Plane::from_point_normal(eye_point + forward * far_distance, -forward),
        );

        Self {
            params,
            eye_point,
            eye_position,
            forward,
            up,
            right,
            far_distance,
            frustum,
        }
    }

    pub fn params(&self) -> &OrbitParams {
        &self.params
    }

    pub fn set_params(&mut self, globe: &Globe, params: OrbitParams) {
        *self = Self::new(globe, params);
    }

    /// Recomputes derived state against `globe` with unchanged parameters.
    pub fn update(&mut self, globe: &Globe) {
        *self = Self::new(globe, self.params);
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Direction through normalized screen coordinates in `[-1, 1]`.
    fn ray_direction(&self, sx: f64, sy: f64) -> Vec3 {
        let tan_x = self.params.field_of_view.tan_half_angle();
        let tan_y = tan_x / self.params.viewport.aspect();
        self.forward + self.right * (sx * tan_x) + self.up * (sy * tan_y)
    }

    /// Where the center, corner and edge rays meet the surface. Missed rays
    /// are `None`.
    fn footprint(&self, globe: &Globe) -> Vec<Option<Position>> {
        FOOTPRINT_SAMPLES
            .iter()
            .map(|&(sx, sy)| {
                let line = Line::new(self.eye_point, self.ray_direction(sx, sy));
                globe.intersect(&line, 0.0)
            })
            .collect()
    }

    fn flat_visible_sector(&self, globe: &Globe, hits: &[Option<Position>]) -> Sector {
        let limit = globe.projection().latitude_limit_degrees();
        let mut points = Vec::with_capacity(hits.len());
        for (hit, &(sx, sy)) in hits.iter().zip(FOOTPRINT_SAMPLES.iter()) {
            let location = match hit {
                Some(p) => p.lat_lon(),
                None => {
                    let dir = self.ray_direction(sx, sy).normalize().unwrap_or(self.forward);
                    let far = self.eye_point + dir * self.far_distance;
                    let p = globe.compute_position_from_point(Vec3::new(far.x, far.y, 0.0));
                    LatLon::from_degrees(
                        p.latitude.degrees().clamp(-limit, limit),
                        p.longitude.degrees().clamp(-180.0, 180.0),
                    )
                }
            };
            points.push(location);
        }
        points.push(self.eye_position.lat_lon());

        let bounds = Sector::bounding_sector(points.iter().map(|ll| {
            LatLon::from_degrees(
                ll.latitude.degrees().clamp(-limit, limit),
                ll.longitude.degrees().clamp(-180.0, 180.0),
            )
        }))
        .unwrap_or(Sector::FULL_SPHERE);
        let pad_lat = bounds.delta_lat().degrees() * 0.1 + 0.01;
        let pad_lon = bounds.delta_lon().degrees() * 0.1 + 0.01;
        Sector::from_degrees(
            (bounds.min_latitude().degrees() - pad_lat).max(-limit),
            (bounds.max_latitude().degrees() + pad_lat).min(limit),
            (bounds.min_longitude().degrees() - pad_lon).max(-180.0),
            (bounds.max_longitude().degrees() + pad_lon).min(180.0),
        )
    }

    /// Horizon cap around the eye, used when some screen rays miss the globe.
    fn horizon_cap_sectors(&self, globe: &Globe) -> Vec<Sector> {
        let r = globe.equatorial_radius();
        let h = self.eye_position.elevation.max(1.0);
        let theta = (r / (r + h)).acos() + (r / (r + HORIZON_TERRAIN_ALLOWANCE_M)).acos();
        let theta_deg = theta.to_degrees();

        let lat = self.eye_position.latitude.degrees();
        let lon = self.eye_position.longitude.degrees();
        let min_lat = (lat - theta_deg).max(-90.0);
        let max_lat = (lat + theta_deg).min(90.0);
        if min_lat <= -90.0 || max_lat >= 90.0 {
            return vec![Sector::from_degrees(min_lat, max_lat, -180.0, 180.0)];
        }
        let ratio = theta.sin() / self.eye_position.latitude.cos();
        if ratio >= 1.0 {
            return vec![Sector::from_degrees(min_lat, max_lat, -180.0, 180.0)];
        }
        let dlon = ratio.asin().to_degrees();
        wrapped_sectors(min_lat, max_lat, lon - dlon, lon + dlon)
    }
}

/// Sectors covering `west..east` where either bound may lie beyond ±180.
fn wrapped_sectors(min_lat: f64, max_lat: f64, west: f64, east: f64) -> Vec<Sector> {
    if east - west >= 360.0 {
        return vec![Sector::from_degrees(min_lat, max_lat, -180.0, 180.0)];
    }
    let w = normalized_degrees_longitude(west);
    let e = normalized_degrees_longitude(east);
    if w == e {
        return vec![Sector::from_degrees(min_lat, max_lat, -180.0, 180.0)];
    }
    Sector::split_wrapping_degrees(min_lat, max_lat, w, e)
}

/// Padded bounds of surface hits, split at the antimeridian when the hits
/// straddle it.
fn footprint_sectors(points: &[LatLon]) -> Vec<Sector> {
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    for ll in points {
        min_lat = min_lat.min(ll.latitude.degrees());
        max_lat = max_lat.max(ll.latitude.degrees());
        min_lon = min_lon.min(ll.longitude.degrees());
        max_lon = max_lon.max(ll.longitude.degrees());
    }
    let (west, east) = if max_lon - min_lon > 180.0 {
        let shifted = points.iter().map(|ll| {
            let lon = ll.longitude.degrees();
            if lon < 0.0 { lon + 360.0 } else { lon }
        });
        let (lo, hi) = shifted.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), lon| {
            (lo.min(lon), hi.max(lon))
        });
        (lo, hi)
    } else {
        (min_lon, max_lon)
    };

    let pad_lat = (max_lat - min_lat) * 0.1 + 0.01;
    let pad_lon = (east - west) * 0.1 + 0.01;
    wrapped_sectors(
        (min_lat - pad_lat).max(-90.0),
        (max_lat + pad_lat).min(90.0),
        west - pad_lon,
        east + pad_lon,
    )
}

impl View for OrbitView {
    fn eye_point(&self) -> Vec3 {
        self.eye_point
    }

    fn eye_position(&self) -> Position {
        self.eye_position
    }

    fn field_of_view(&self) -> Angle {
        self.params.field_of_view
    }

    fn heading(&self) -> Option<Angle> {
        Some(self.params.heading)
    }

    fn pitch(&self) -> Option<Angle> {
        Some(self.params.pitch)
    }

    fn viewport(&self) -> Viewport {
        self.params.viewport
    }

    fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn center_position(&self) -> Option<Position> {
        Some(self.params.center)
    }

    fn visible_sectors(&self, globe: &Globe) -> Vec<Sector> {
        let hits = self.footprint(globe);
        if globe.is_flat() {
            return vec![self.flat_visible_sector(globe, &hits)];
        }

        let all_hit = hits.iter().all(Option::is_some);
        let mut sectors = if all_hit {
            let points: Vec<LatLon> = hits.iter().flatten().map(|p| p.lat_lon()).collect();
            footprint_sectors(&points)
        } else {
            self.horizon_cap_sectors(globe)
        };

        // A pole in view makes every longitude visible near it.
        for (pole, lat) in [(Angle::POS90, 90.0_f64), (Angle::NEG90, -90.0_f64)] {
            let p = globe.point_from_position(pole, Angle::ZERO, 0.0);
            let normal = globe.surface_normal_at_location(pole, Angle::ZERO);
            let facing = (p - self.eye_point).dot(normal) < 0.0;
            if facing && self.frustum.contains(p) {
                let (lo, hi) = sectors.iter().fold((lat, lat), |(lo, hi), s| {
                    (
                        lo.min(s.min_latitude().degrees()),
                        hi.max(s.max_latitude().degrees()),
                    )
                });
                sectors = vec![Sector::from_degrees(lo, hi, -180.0, 180.0)];
            }
        }
        trace!(count = sectors.len(), "visible sectors");
        sectors
    }
}

#[cfg(test)]
mod tests {
    use super::{OrbitParams, OrbitView, footprint_sectors};
    use crate::view::{View, Viewport};
    use foundation::{Angle, LatLon, Position};
    use globe::{Globe, Projection};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn view_at(globe: &Globe, lat: f64, lon: f64, range: f64) -> OrbitView {
        OrbitView::new(
            globe,
            OrbitParams::looking_at(Position::from_degrees(lat, lon, 0.0), range),
        )
    }

    #[test]
    fn nadir_view_sits_above_center() {
        let globe = Globe::wgs84();
        let view = view_at(&globe, 45.0, 7.0, 100_000.0);
        let eye = view.eye_position();
        assert_close(eye.latitude.degrees(), 45.0, 1e-7);
        assert_close(eye.longitude.degrees(), 7.0, 1e-7);
        assert_close(eye.elevation, 100_000.0, 1e-3);

        let center = globe.point_from_position(Angle::from_degrees(45.0), Angle::from_degrees(7.0), 0.0);
        assert!(view.frustum().contains(center));
        let behind = globe.point_from_position(Angle::from_degrees(-45.0), Angle::from_degrees(-173.0), 0.0);
        assert!(!view.frustum().contains(behind));
    }

    #[test]
    fn pitched_view_looks_toward_heading() {
        let globe = Globe::wgs84();
        let params = OrbitParams::looking_at(Position::from_degrees(0.0, 0.0, 0.0), 50_000.0)
            .with_pitch(Angle::from_degrees(60.0));
        let view = OrbitView::new(&globe, params);
        // Heading north: the eye sits south of the center.
        assert!(view.eye_position().latitude.degrees() < 0.0);
        assert_close(view.eye_position().longitude.degrees(), 0.0, 1e-9);
        assert!(view.forward().z > 0.0);
    }

    #[test]
    fn pixel_size_scales_with_distance() {
        let globe = Globe::wgs84();
        let params = OrbitParams::looking_at(Position::default(), 1000.0)
            .with_field_of_view(Angle::from_degrees(90.0))
            .with_viewport(Viewport::new(1000, 500));
        let view = OrbitView::new(&globe, params);
        assert_close(view.compute_pixel_size_at_distance(1000.0), 2.0, 1e-9);
        assert_close(view.compute_pixel_size_at_distance(-1000.0), 2.0, 1e-9);
    }

    #[test]
    fn close_view_sector_surrounds_center() {
        let globe = Globe::wgs84();
        let view = view_at(&globe, 45.0, 7.0, 200_000.0);
        let sectors = view.visible_sectors(&globe);
        assert_eq!(sectors.len(), 1);
        let s = sectors[0];
        assert!(s.contains(LatLon::from_degrees(45.0, 7.0)));
        assert!(s.delta_lat().degrees() < 10.0);
        assert!(s.delta_lon().degrees() < 10.0);
    }

    #[test]
    fn antimeridian_view_splits() {
        let globe = Globe::wgs84();
        let view = view_at(&globe, 0.0, 180.0, 500_000.0);
        let sectors = view.visible_sectors(&globe);
        assert_eq!(sectors.len(), 2);
        assert!(sectors.iter().any(|s| s.contains(LatLon::from_degrees(0.0, 179.0))));
        assert!(sectors.iter().any(|s| s.contains(LatLon::from_degrees(0.0, -179.0))));
        assert!(!sectors.iter().any(|s| s.contains(LatLon::from_degrees(0.0, 90.0))));
    }

    #[test]
    fn far_view_uses_horizon_cap() {
        let globe = Globe::wgs84();
        let view = view_at(&globe, 0.0, 0.0, 20_000_000.0);
        let sectors = view.visible_sectors(&globe);
        assert!(sectors.iter().any(|s| s.contains(LatLon::from_degrees(60.0, 60.0))));
        assert!(!sectors.iter().any(|s| s.contains(LatLon::from_degrees(0.0, 180.0))));
    }

    #[test]
    fn polar_view_spans_all_longitudes() {
        let globe = Globe::wgs84();
        let view = view_at(&globe, 89.0, 0.0, 1_000_000.0);
        let sectors = view.visible_sectors(&globe);
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].min_longitude().degrees(), -180.0);
        assert_eq!(sectors[0].max_longitude().degrees(), 180.0);
        assert_eq!(sectors[0].max_latitude().degrees(), 90.0);
    }

    #[test]
    fn flat_view_sector_is_clamped() {
        let globe = Globe::wgs84().with_projection(Projection::Mercator);
        let view = view_at(&globe, 70.0, 179.0, 3_000_000.0);
        let sectors = view.visible_sectors(&globe);
        assert_eq!(sectors.len(), 1);
        let s = sectors[0];
        assert!(s.max_latitude().degrees() <= 75.0);
        assert!(s.max_longitude().degrees() <= 180.0);
        assert!(s.contains(LatLon::from_degrees(70.0, 179.0)));
    }

    #[test]
    fn footprint_straddling_antimeridian() {
        let sectors = footprint_sectors(&[
            LatLon::from_degrees(-1.0, 179.0),
            LatLon::from_degrees(1.0, -179.0),
        ]);
        assert_eq!(sectors.len(), 2);
        assert!(sectors[0].min_longitude().degrees() < 179.0);
        assert_eq!(sectors[0].max_longitude().degrees(), 180.0);
        assert_eq!(sectors[1].min_longitude().degrees(), -180.0);
        assert!(sectors[1].max_longitude().degrees() > -179.0);
    }
}
