use core::fmt;

use foundation::math::{Cylinder, Ellipsoid, Line, Plane, Vec3};
use foundation::{Angle, LatLon, Position, Sector};
use tracing::debug;

use crate::elevation::{ElevationModel, ZeroElevationModel};
use crate::local::LocalFrame;
use crate::projection::Projection;

/// Identity of everything that changes model coordinates.
///
/// Caches holding model-space geometry compare keys and rebuild on mismatch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeStateKey {
    pub ellipsoid: Ellipsoid,
    pub projection: Projection,
    pub elevation_generation: u64,
}

/// The world model: reference ellipsoid, active projection and terrain.
pub struct Globe {
    ellipsoid: Ellipsoid,
    projection: Projection,
    elevation_model: Box<dyn ElevationModel>,
    elevation_generation: u64,
}

impl fmt::Debug for Globe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Globe")
            .field("ellipsoid", &self.ellipsoid)
            .field("projection", &self.projection)
            .field("elevation_model", &self.elevation_model)
            .finish()
    }
}

impl Default for Globe {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Globe {
    pub fn new(
        ellipsoid: Ellipsoid,
        projection: Projection,
        elevation_model: Box<dyn ElevationModel>,
    ) -> Self {
        Self {
            ellipsoid,
            projection,
            elevation_model,
            elevation_generation: 0,
        }
    }

    /// Round WGS84 earth without terrain.
    pub fn wgs84() -> Self {
        Self::new(
            Ellipsoid::WGS84,
            Projection::Ellipsoidal,
            Box::new(ZeroElevationModel),
        )
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_elevation_model(mut self, model: Box<dyn ElevationModel>) -> Self {
        self.set_elevation_model(model);
        self
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn equatorial_radius(&self) -> f64 {
        self.ellipsoid.equatorial_radius
    }

    pub fn polar_radius(&self) -> f64 {
        self.ellipsoid.polar_radius
    }

    pub fn eccentricity_squared(&self) -> f64 {
        self.ellipsoid.eccentricity_squared
    }

    /// Distance from the center to the surface at a geodetic latitude.
    /// Flat worlds report the equatorial radius.
    pub fn radius_at(&self, lat: Angle) -> f64 {
        if self.is_flat() {
            return self.ellipsoid.equatorial_radius;
        }
        self.point_from_position(lat, Angle::ZERO, 0.0).length()
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if projection != self.projection {
            debug!(from = %self.projection, to = %projection, "globe projection changed");
            self.projection = projection;
        }
    }

    pub fn is_flat(&self) -> bool {
        self.projection.is_flat()
    }

    pub fn elevation_model(&self) -> &dyn ElevationModel {
        self.elevation_model.as_ref()
    }

    pub fn set_elevation_model(&mut self, model: Box<dyn ElevationModel>) {
        self.elevation_model = model;
        self.elevation_generation += 1;
    }

    pub fn state_key(&self) -> GlobeStateKey {
        GlobeStateKey {
            ellipsoid: self.ellipsoid,
            projection: self.projection,
            elevation_generation: self.elevation_generation,
        }
    }

    /// Terrain height; zero for out-of-range coordinates.
    pub fn elevation(&self, lat: Angle, lon: Angle) -> f64 {
        if !lat.is_valid_latitude() || !lon.is_valid_longitude() {
            return 0.0;
        }
        self.elevation_model.elevation(lat, lon)
    }

    pub fn min_and_max_elevations(&self, sector: &Sector) -> (f64, f64) {
        self.elevation_model.min_and_max_elevations(sector)
    }

    pub fn extreme_elevations(&self) -> (f64, f64) {
        self.elevation_model.extreme_elevations()
    }

    pub fn point_from_position(&self, lat: Angle, lon: Angle, elevation: f64) -> Vec3 {
        self.projection
            .project_flat(lat, lon, elevation, self.ellipsoid.equatorial_radius)
            .unwrap_or_else(|| {
                self.ellipsoid
                    .geodetic_to_ecef(lat.radians(), lon.radians(), elevation)
            })
    }

    pub fn point_from_location(&self, location: LatLon, elevation: f64) -> Vec3 {
        self.point_from_position(location.latitude, location.longitude, elevation)
    }

    pub fn point_from(&self, position: &Position) -> Vec3 {
        self.point_from_position(position.latitude, position.longitude, position.elevation)
    }

    pub fn compute_position_from_point(&self, point: Vec3) -> Position {
        self.projection
            .unproject_flat(point, self.ellipsoid.equatorial_radius)
            .unwrap_or_else(|| self.ellipsoid.ecef_to_geodetic(point))
    }

    /// Terrain point scaled by `vertical_exaggeration`.
    pub fn surface_point(&self, lat: Angle, lon: Angle, vertical_exaggeration: f64) -> Vec3 {
        let h = self.elevation(lat, lon) * vertical_exaggeration;
        self.point_from_position(lat, lon, h)
    }

    pub fn local_frame(&self, lat: Angle, lon: Angle) -> LocalFrame {
        let origin = self.point_from_position(lat, lon, 0.0);
        if self.is_flat() {
            LocalFrame::flat(origin)
        } else {
            LocalFrame::geodetic(origin, lat, lon)
        }
    }

    pub fn surface_normal_at_location(&self, lat: Angle, lon: Angle) -> Vec3 {
        self.local_frame(lat, lon).up
    }

    /// Nearest forward hit of `line` with the surface `altitude` meters up.
    pub fn intersect(&self, line: &Line, altitude: f64) -> Option<Position> {
        let point = if self.is_flat() {
            let plane = Plane::new(Vec3::UNIT_Z, -altitude);
            let t = plane.intersect_line(line)?;
            if t < 0.0 {
                return None;
            }
            line.point_at(t)
        } else {
            self.intersect_ellipsoid(line, altitude)?
        };

        let position = self.compute_position_from_point(point);
        let limit = self.projection.latitude_limit_degrees();
        let valid = position.lat_lon().is_valid()
            && position.latitude.degrees().abs() <= limit
            && position.elevation.is_finite();
        valid.then_some(position)
    }

    fn intersect_ellipsoid(&self, line: &Line, altitude: f64) -> Option<Vec3> {
        let a = self.ellipsoid.equatorial_radius + altitude;
        let b = self.ellipsoid.polar_radius + altitude;
        if a <= 0.0 || b <= 0.0 {
            return None;
        }
        // Scale into the unit sphere and solve |o + t d|^2 = 1.
        let o = Vec3::new(line.origin.x / a, line.origin.y / a, line.origin.z / b);
        let d = Vec3::new(
            line.direction.x / a,
            line.direction.y / a,
            line.direction.z / b,
        );
        let qa = d.dot(d);
        let qb = 2.0 * o.dot(d);
        let qc = o.dot(o) - 1.0;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 || qa <= 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let t0 = (-qb - root) / (2.0 * qa);
        let t1 = (-qb + root) / (2.0 * qa);
        let t = if t0 >= 0.0 {
            t0
        } else if t1 >= 0.0 {
            t1
        } else {
            return None;
        };
        Some(line.point_at(t))
    }

    /// Loose cylinder enclosing the terrain of `sector`.
    ///
    /// The axis runs along the surface normal at the centroid from the
    /// minimum to the maximum exaggerated elevation, lowered further when
    /// the curved surface at the corners dips below it.
    pub fn bounding_cylinder(&self, sector: &Sector, vertical_exaggeration: f64) -> Cylinder {
        let (min_e, max_e) = self.min_and_max_elevations(sector);
        let min_h = min_e * vertical_exaggeration;
        let mut max_h = max_e * vertical_exaggeration;
        if max_h - min_h < 1.0 {
            max_h = min_h + 1.0;
        }

        let centroid = sector.centroid();
        let bottom = self.point_from_location(centroid, min_h);
        let top = self.point_from_location(centroid, max_h);
        let axis = (top - bottom)
            .normalize()
            .unwrap_or_else(|| self.surface_normal_at_location(centroid.latitude, centroid.longitude));

        let mut radius = 0.0_f64;
        let mut drop = 0.0_f64;
        for corner in sector.corners() {
            radius = radius.max(self.point_from_location(corner, max_h).distance_to(top));
            let low = self.point_from_location(corner, min_h);
            drop = drop.max(-(low - bottom).dot(axis));
        }

        Cylinder::new(bottom - axis * drop, top, radius)
    }

    /// Straight-line distance to the horizon from `altitude` meters up.
    pub fn horizon_distance(&self, altitude: f64) -> f64 {
        if altitude <= 0.0 {
            return 0.0;
        }
        let r = self.ellipsoid.equatorial_radius;
        (altitude * (2.0 * r + altitude)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::Globe;
    use crate::elevation::{ConstantElevationModel, RasterElevationModel};
    use crate::projection::Projection;
    use foundation::math::{Line, Vec3, WGS84_A, WGS84_B};
    use foundation::{Angle, LatLon, Sector};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn deg(d: f64) -> Angle {
        Angle::from_degrees(d)
    }

    #[test]
    fn round_trip_all_projections() {
        for projection in Projection::ALL {
            let globe = Globe::wgs84().with_projection(projection);
            for (lat, lon) in [(0.0, 0.0), (47.5, 8.25), (-33.9, 151.2), (70.0, -150.0)] {
                let p = globe.point_from_position(deg(lat), deg(lon), 250.0);
                let back = globe.compute_position_from_point(p);
                assert_close(back.latitude.degrees(), lat, 1e-6);
                assert_close(back.longitude.degrees(), lon, 1e-6);
                assert_close(back.elevation, 250.0, 1e-3);
            }
        }
    }

    #[test]
    fn ellipsoid_axes() {
        let globe = Globe::wgs84();
        let eq = globe.point_from_position(Angle::ZERO, Angle::ZERO, 0.0);
        assert_close(eq.x, WGS84_A, 1e-6);
        let pole = globe.point_from_position(Angle::POS90, Angle::ZERO, 0.0);
        assert_close(pole.z, WGS84_B, 1e-6);
        assert_close(globe.radius_at(Angle::ZERO), WGS84_A, 1e-6);
        assert_close(globe.radius_at(Angle::POS90), WGS84_B, 1e-6);
    }

    #[test]
    fn mercator_globe_clamps_high_latitudes() {
        let globe = Globe::wgs84().with_projection(Projection::Mercator);
        let a = globe.point_from_position(deg(89.0), deg(10.0), 0.0);
        let b = globe.point_from_position(deg(75.0), deg(10.0), 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn elevation_out_of_range_is_zero() {
        let globe = Globe::wgs84().with_elevation_model(Box::new(ConstantElevationModel(42.0)));
        assert_eq!(globe.elevation(deg(10.0), deg(10.0)), 42.0);
        assert_eq!(globe.elevation(deg(91.0), deg(10.0)), 0.0);
        assert_eq!(globe.elevation(deg(10.0), deg(-181.0)), 0.0);
    }

    #[test]
    fn ellipsoid_intersection_from_space() {
        let globe = Globe::wgs84();
        let line = Line::new(Vec3::new(2.0 * WGS84_A, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hit = globe.intersect(&line, 0.0).unwrap();
        assert_close(hit.latitude.degrees(), 0.0, 1e-9);
        assert_close(hit.longitude.degrees(), 0.0, 1e-9);
        assert_close(hit.elevation, 0.0, 1e-6);

        let lifted = globe.intersect(&line, 1000.0).unwrap();
        assert_close(lifted.elevation, 1000.0, 1e-6);

        let away = Line::new(Vec3::new(2.0 * WGS84_A, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(globe.intersect(&away, 0.0).is_none());
        let miss = Line::new(Vec3::new(2.0 * WGS84_A, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(globe.intersect(&miss, 0.0).is_none());
    }

    #[test]
    fn flat_intersection_hits_plane() {
        let globe = Globe::wgs84().with_projection(Projection::PlateCarree);
        let target = globe.point_from_position(deg(10.0), deg(20.0), 0.0);
        let line = Line::new(target + Vec3::new(0.0, 0.0, 5000.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = globe.intersect(&line, 0.0).unwrap();
        assert_close(hit.latitude.degrees(), 10.0, 1e-9);
        assert_close(hit.longitude.degrees(), 20.0, 1e-9);

        let off_map = Line::new(Vec3::new(0.0, 4.0 * WGS84_A, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(globe.intersect(&off_map, 0.0).is_none());
        let horizontal = Line::new(Vec3::new(0.0, 0.0, 10.0), Vec3::UNIT_X);
        assert!(globe.intersect(&horizontal, 0.0).is_none());
    }

    #[test]
    fn bounding_cylinder_encloses_sector_terrain() {
        let raster = RasterElevationModel::new(
            Sector::from_degrees(40.0, 48.0, 0.0, 6.0),
            2,
            2,
            vec![100.0, 2500.0, 400.0, 900.0],
        )
        .unwrap();
        let globe = Globe::wgs84().with_elevation_model(Box::new(raster));
        let sector = Sector::from_degrees(40.0, 48.0, 0.0, 6.0);
        let c = globe.bounding_cylinder(&sector, 2.0);
        let axis = c.axis_unit().unwrap();

        let mut samples = sector.corners().to_vec();
        samples.push(sector.centroid());
        samples.push(LatLon::from_degrees(44.0, 0.0));
        for ll in samples {
            for h in [200.0, 5000.0] {
                let p = globe.point_from_location(ll, h);
                let along = (p - c.bottom_center).dot(axis);
                assert!(along >= -1e-6 && along <= c.height() + 1e-6, "{ll} at {h}");
                let radial = (p - c.bottom_center - axis * along).length();
                assert!(radial <= c.radius + 1e-6, "{ll} at {h}");
            }
        }
    }

    #[test]
    fn flat_sector_cylinder_is_padded() {
        let globe = Globe::wgs84().with_projection(Projection::PlateCarree);
        let c = globe.bounding_cylinder(&Sector::from_degrees(0.0, 1.0, 0.0, 1.0), 1.0);
        assert_close(c.height(), 1.0, 1e-9);
        assert_eq!(c.axis_unit().unwrap(), Vec3::UNIT_Z);
    }

    #[test]
    fn state_key_tracks_projection_and_terrain() {
        let mut globe = Globe::wgs84();
        let k0 = globe.state_key();
        globe.set_projection(Projection::Ellipsoidal);
        assert_eq!(globe.state_key(), k0);
        globe.set_projection(Projection::Sinusoidal);
        let k1 = globe.state_key();
        assert_ne!(k1, k0);
        globe.set_elevation_model(Box::new(ConstantElevationModel(1.0)));
        assert_ne!(globe.state_key(), k1);
    }

    #[test]
    fn local_frame_matches_projection() {
        let flat = Globe::wgs84().with_projection(Projection::Mercator);
        assert_eq!(flat.surface_normal_at_location(deg(30.0), deg(30.0)), Vec3::UNIT_Z);
        let round = Globe::wgs84();
        let up = round.surface_normal_at_location(Angle::POS90, Angle::ZERO);
        assert_close(up.z, 1.0, 1e-12);
    }

    #[test]
    fn horizon_distance_grows_with_altitude() {
        let globe = Globe::wgs84();
        assert_eq!(globe.horizon_distance(0.0), 0.0);
        let d = globe.horizon_distance(10_000.0);
        assert_close(d, (10_000.0_f64 * (2.0 * WGS84_A + 10_000.0)).sqrt(), 1e-6);
    }
}
