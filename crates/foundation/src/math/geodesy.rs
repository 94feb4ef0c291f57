use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use core::fmt;
use core::str::FromStr;

use super::Vec3;
use crate::angle::{Angle, normalized_degrees_longitude};
use crate::latlon::{LatLon, Position};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Reference ellipsoid parameters. Fixed for the lifetime of a globe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipsoid {
    pub equatorial_radius: f64,
    pub polar_radius: f64,
    pub eccentricity_squared: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        equatorial_radius: WGS84_A,
        polar_radius: WGS84_B,
        eccentricity_squared: WGS84_E2,
    };

    pub fn new(equatorial_radius: f64, polar_radius: f64, eccentricity_squared: f64) -> Self {
        assert!(
            equatorial_radius > 0.0 && polar_radius > 0.0,
            "ellipsoid radii must be positive"
        );
        assert!(
            (0.0..1.0).contains(&eccentricity_squared),
            "eccentricity squared must be in [0, 1)"
        );
        Self {
            equatorial_radius,
            polar_radius,
            eccentricity_squared,
        }
    }

    /// Second eccentricity squared.
    pub fn second_eccentricity_squared(&self) -> f64 {
        let a2 = self.equatorial_radius * self.equatorial_radius;
        let b2 = self.polar_radius * self.polar_radius;
        (a2 - b2) / b2
    }

    /// Radius of curvature in the prime vertical.
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let s = lat_rad.sin();
        self.equatorial_radius / (1.0 - self.eccentricity_squared * s * s).sqrt()
    }

    /// Standard geodetic to Earth-centered, Earth-fixed conversion.
    pub fn geodetic_to_ecef(&self, lat_rad: f64, lon_rad: f64, height: f64) -> Vec3 {
        let sin_lat = lat_rad.sin();
        let cos_lat = lat_rad.cos();
        let sin_lon = lon_rad.sin();
        let cos_lon = lon_rad.cos();

        let n = self.prime_vertical_radius(lat_rad);
        let x = (n + height) * cos_lat * cos_lon;
        let y = (n + height) * cos_lat * sin_lon;
        let z = (n * (1.0 - self.eccentricity_squared) + height) * sin_lat;

        Vec3::new(x, y, z)
    }

    /// Bowring's inverse. Points on the polar axis map to longitude zero.
    pub fn ecef_to_geodetic(&self, ecef: Vec3) -> Position {
        let a = self.equatorial_radius;
        let b = self.polar_radius;
        let e2 = self.eccentricity_squared;
        let ep2 = self.second_eccentricity_squared();

        let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
        if p < 1e-9 {
            let lat = if ecef.z >= 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            return Position::new(Angle::from_radians(lat), Angle::ZERO, ecef.z.abs() - b);
        }
        let lon = ecef.y.atan2(ecef.x);

        let theta = (ecef.z * a).atan2(p * b);
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        let lat = (ecef.z + ep2 * b * sin_theta * sin_theta * sin_theta)
            .atan2(p - e2 * a * cos_theta * cos_theta * cos_theta);

        let n = self.prime_vertical_radius(lat);
        let cos_lat = lat.cos();
        let height = if cos_lat.abs() > 1e-10 {
            p / cos_lat - n
        } else {
            ecef.z.abs() - b
        };

        Position::new(Angle::from_radians(lat), Angle::from_radians(lon), height)
    }
}

/// Horizontal interpolation rule between two locations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum PathType {
    Linear,
    RhumbLine,
    #[default]
    GreatCircle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePathTypeError(pub String);

impl fmt::Display for ParsePathTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown path type: {}", self.0)
    }
}

impl std::error::Error for ParsePathTypeError {}

impl FromStr for PathType {
    type Err = ParsePathTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(PathType::Linear),
            "rhumb" | "rhumb-line" | "rhumb_line" => Ok(PathType::RhumbLine),
            "great-circle" | "great_circle" | "greatcircle" => Ok(PathType::GreatCircle),
            _ => Err(ParsePathTypeError(s.to_string())),
        }
    }
}

fn wrap_delta_lon(d_lon: f64) -> f64 {
    if d_lon.abs() > PI {
        if d_lon > 0.0 {
            -(2.0 * PI - d_lon)
        } else {
            2.0 * PI + d_lon
        }
    } else {
        d_lon
    }
}

fn normalized_location_radians(lat: f64, lon: f64) -> LatLon {
    LatLon::from_radians(lat, lon).normalized()
}

/// Initial bearing of the great circle from `a` to `b`, clockwise from north.
pub fn great_circle_azimuth(a: LatLon, b: LatLon) -> Angle {
    let lat1 = a.latitude.radians();
    let lon1 = a.longitude.radians();
    let lat2 = b.latitude.radians();
    let lon2 = b.longitude.radians();

    if lat1 == lat2 && lon1 == lon2 {
        return Angle::ZERO;
    }
    if lon1 == lon2 {
        return if lat1 > lat2 {
            Angle::POS180
        } else {
            Angle::ZERO
        };
    }

    let y = lat2.cos() * (lon2 - lon1).sin();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * (lon2 - lon1).cos();
    let azimuth = y.atan2(x);
    if azimuth.is_nan() {
        Angle::ZERO
    } else {
        Angle::from_radians(azimuth)
    }
}

/// Central angle between two locations (haversine).
pub fn great_circle_distance(a: LatLon, b: LatLon) -> Angle {
    let lat1 = a.latitude.radians();
    let lon1 = a.longitude.radians();
    let lat2 = b.latitude.radians();
    let lon2 = b.longitude.radians();

    if lat1 == lat2 && lon1 == lon2 {
        return Angle::ZERO;
    }

    let a_lat = ((lat2 - lat1) / 2.0).sin();
    let a_lon = ((lon2 - lon1) / 2.0).sin();
    let h = a_lat * a_lat + lat1.cos() * lat2.cos() * a_lon * a_lon;
    let distance = 2.0 * h.sqrt().min(1.0).asin();
    if distance.is_nan() {
        Angle::ZERO
    } else {
        Angle::from_radians(distance)
    }
}

/// Location reached by travelling `distance` along a great circle at `azimuth`.
pub fn great_circle_end_position(p: LatLon, azimuth: Angle, distance: Angle) -> LatLon {
    if distance.radians() == 0.0 {
        return p;
    }
    let lat = p.latitude.radians();
    let lon = p.longitude.radians();
    let az = azimuth.radians();
    let d = distance.radians();

    let end_lat = (lat.sin() * d.cos() + lat.cos() * d.sin() * az.cos()).clamp(-1.0, 1.0).asin();
    let end_lon = lon + (az.sin() * d.sin() * lat.cos()).atan2(d.cos() - lat.sin() * end_lat.sin());

    if end_lat.is_nan() || end_lon.is_nan() {
        return p;
    }
    normalized_location_radians(end_lat, end_lon)
}

pub fn great_circle_midpoint(a: LatLon, b: LatLon) -> LatLon {
    let azimuth = great_circle_azimuth(a, b);
    let distance = great_circle_distance(a, b);
    great_circle_end_position(a, azimuth, distance / 2.0)
}

fn mercator_phi(lat: f64) -> f64 {
    (lat / 2.0 + FRAC_PI_4).tan().ln()
}

fn rhumb_q(lat1: f64, lat2: f64) -> f64 {
    let d_phi = mercator_phi(lat2) - mercator_phi(lat1);
    let d_lat = lat2 - lat1;
    // Along a parallel the stretched-latitude ratio degenerates to cos(lat).
    if d_phi.abs() > 1e-12 && d_phi.is_finite() {
        d_lat / d_phi
    } else {
        lat1.cos()
    }
}

/// Constant bearing of the rhumb line from `a` to `b`.
pub fn rhumb_azimuth(a: LatLon, b: LatLon) -> Angle {
    let lat1 = a.latitude.radians();
    let lat2 = b.latitude.radians();
    if lat1 == lat2 && a.longitude == b.longitude {
        return Angle::ZERO;
    }
    let d_lon = wrap_delta_lon(b.longitude.radians() - a.longitude.radians());
    let d_phi = mercator_phi(lat2) - mercator_phi(lat1);
    let azimuth = d_lon.atan2(d_phi);
    if azimuth.is_nan() {
        Angle::ZERO
    } else {
        Angle::from_radians(azimuth)
    }
}

/// Rhumb-line length as an angle on the unit sphere.
pub fn rhumb_distance(a: LatLon, b: LatLon) -> Angle {
    let lat1 = a.latitude.radians();
    let lat2 = b.latitude.radians();
    if lat1 == lat2 && a.longitude == b.longitude {
        return Angle::ZERO;
    }
    let d_lat = lat2 - lat1;
    let d_lon = wrap_delta_lon(b.longitude.radians() - a.longitude.radians());
    let q = rhumb_q(lat1, lat2);
    let distance = (d_lat * d_lat + q * q * d_lon * d_lon).sqrt();
    if distance.is_nan() {
        Angle::ZERO
    } else {
        Angle::from_radians(distance)
    }
}

pub fn rhumb_end_position(p: LatLon, azimuth: Angle, distance: Angle) -> LatLon {
    if distance.radians() == 0.0 {
        return p;
    }
    let lat1 = p.latitude.radians();
    let lon1 = p.longitude.radians();
    let az = azimuth.radians();
    let d = distance.radians();

    let mut lat2 = lat1 + d * az.cos();
    let q = rhumb_q(lat1, lat2);
    let d_lon = d * az.sin() / q;

    if lat2.abs() > FRAC_PI_2 {
        lat2 = if lat2 > 0.0 { PI - lat2 } else { -PI - lat2 };
    }
    let lon2 = lon1 + d_lon;
    if lat2.is_nan() || lon2.is_nan() {
        return p;
    }
    normalized_location_radians(lat2, lon2)
}

/// Bearing in the lat/lon plane, honouring the shorter way around in longitude.
pub fn linear_azimuth(a: LatLon, b: LatLon) -> Angle {
    let d_lat = b.latitude.radians() - a.latitude.radians();
    let d_lon = wrap_delta_lon(b.longitude.radians() - a.longitude.radians());
    if d_lat == 0.0 && d_lon == 0.0 {
        return Angle::ZERO;
    }
    Angle::from_radians(d_lon.atan2(d_lat))
}

pub fn linear_distance(a: LatLon, b: LatLon) -> Angle {
    let d_lat = b.latitude.radians() - a.latitude.radians();
    let d_lon = wrap_delta_lon(b.longitude.radians() - a.longitude.radians());
    Angle::from_radians((d_lat * d_lat + d_lon * d_lon).sqrt())
}

pub fn linear_end_position(p: LatLon, azimuth: Angle, distance: Angle) -> LatLon {
    let lat = p.latitude.radians() + distance.radians() * azimuth.cos();
    let lon = p.longitude.radians() + distance.radians() * azimuth.sin();
    normalized_location_radians(lat, lon)
}

pub fn azimuth(path_type: PathType, a: LatLon, b: LatLon) -> Angle {
    match path_type {
        PathType::Linear => linear_azimuth(a, b),
        PathType::RhumbLine => rhumb_azimuth(a, b),
        PathType::GreatCircle => great_circle_azimuth(a, b),
    }
}

pub fn distance(path_type: PathType, a: LatLon, b: LatLon) -> Angle {
    match path_type {
        PathType::Linear => linear_distance(a, b),
        PathType::RhumbLine => rhumb_distance(a, b),
        PathType::GreatCircle => great_circle_distance(a, b),
    }
}

pub fn end_position(path_type: PathType, p: LatLon, azimuth: Angle, distance: Angle) -> LatLon {
    match path_type {
        PathType::Linear => linear_end_position(p, azimuth, distance),
        PathType::RhumbLine => rhumb_end_position(p, azimuth, distance),
        PathType::GreatCircle => great_circle_end_position(p, azimuth, distance),
    }
}

/// Location at fraction `t` of the path from `a` to `b`.
///
/// `t` is clamped to [0, 1] and the endpoints are returned verbatim. Linear
/// interpolation takes the shorter way around in longitude, matching
/// [`linear_distance`].
pub fn interpolate(path_type: PathType, t: f64, a: LatLon, b: LatLon) -> LatLon {
    assert!(!t.is_nan(), "interpolation amount is NaN");
    if t <= 0.0 || a == b {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    match path_type {
        PathType::Linear => {
            let mut d_lon = b.longitude.degrees() - a.longitude.degrees();
            if d_lon > 180.0 {
                d_lon -= 360.0;
            } else if d_lon < -180.0 {
                d_lon += 360.0;
            }
            let lon = normalized_degrees_longitude(a.longitude.degrees() + t * d_lon);
            LatLon::new(Angle::mix(t, a.latitude, b.latitude), Angle::from_degrees(lon))
        }
        PathType::RhumbLine | PathType::GreatCircle => {
            let az = azimuth(path_type, a, b);
            let d = distance(path_type, a, b);
            end_position(path_type, a, az, d * t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let ecef = Ellipsoid::WGS84.geodetic_to_ecef(0.0, 0.0, 0.0);
        assert_close(ecef.x, WGS84_A, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_north_pole() {
        let ecef = Ellipsoid::WGS84.geodetic_to_ecef(FRAC_PI_2, 0.0, 0.0);
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.z, WGS84_B, 1e-6);
        let back = Ellipsoid::WGS84.ecef_to_geodetic(ecef);
        assert_close(back.latitude.degrees(), 90.0, 1e-9);
        assert_close(back.elevation, 0.0, 1e-6);
    }

    #[test]
    fn round_trip_geodetic_ecef() {
        let e = Ellipsoid::WGS84;
        let ecef = e.geodetic_to_ecef(core::f64::consts::FRAC_PI_6, -core::f64::consts::FRAC_PI_3, 120.0);
        let back = e.ecef_to_geodetic(ecef);
        assert_close(back.latitude.radians(), core::f64::consts::FRAC_PI_6, 1e-9);
        assert_close(back.longitude.radians(), -core::f64::consts::FRAC_PI_3, 1e-9);
        assert_close(back.elevation, 120.0, 1e-6);
    }

    #[test]
    fn great_circle_quarter_meridian() {
        let a = LatLon::from_degrees(0.0, 0.0);
        let b = LatLon::from_degrees(90.0, 0.0);
        assert_close(great_circle_distance(a, b).degrees(), 90.0, 1e-9);
        assert_eq!(great_circle_azimuth(a, b).degrees(), 0.0);
        let c = LatLon::from_degrees(0.0, 90.0);
        assert_close(great_circle_azimuth(a, c).degrees(), 90.0, 1e-9);
    }

    #[test]
    fn great_circle_end_position_on_equator() {
        let end = great_circle_end_position(
            LatLon::from_degrees(0.0, 10.0),
            Angle::from_degrees(90.0),
            Angle::from_degrees(20.0),
        );
        assert_close(end.latitude.degrees(), 0.0, 1e-9);
        assert_close(end.longitude.degrees(), 30.0, 1e-9);
    }

    #[test]
    fn great_circle_midpoint_crosses_antimeridian() {
        let mid = great_circle_midpoint(
            LatLon::from_degrees(0.0, 170.0),
            LatLon::from_degrees(0.0, -170.0),
        );
        assert_close(mid.latitude.degrees(), 0.0, 1e-9);
        assert_close(mid.longitude.degrees().abs(), 180.0, 1e-9);
    }

    #[test]
    fn rhumb_along_parallel_keeps_latitude() {
        let a = LatLon::from_degrees(45.0, 0.0);
        let b = LatLon::from_degrees(45.0, 10.0);
        assert_close(rhumb_azimuth(a, b).degrees(), 90.0, 1e-9);
        let mid = interpolate(PathType::RhumbLine, 0.5, a, b);
        assert_close(mid.latitude.degrees(), 45.0, 1e-9);
        assert_close(mid.longitude.degrees(), 5.0, 1e-9);
        // Length along the parallel shrinks with cos(lat).
        assert_close(
            rhumb_distance(a, b).radians(),
            10f64.to_radians() * 45f64.to_radians().cos(),
            1e-12,
        );
    }

    #[test]
    fn rhumb_end_position_reaches_target() {
        let a = LatLon::from_degrees(10.0, -20.0);
        let b = LatLon::from_degrees(40.0, 15.0);
        let end = rhumb_end_position(a, rhumb_azimuth(a, b), rhumb_distance(a, b));
        assert_close(end.latitude.degrees(), 40.0, 1e-9);
        assert_close(end.longitude.degrees(), 15.0, 1e-9);
    }

    #[test]
    fn interpolation_endpoints_are_exact() {
        let a = LatLon::from_degrees(12.5, -33.25);
        let b = LatLon::from_degrees(-41.0, 71.5);
        for path_type in [PathType::Linear, PathType::RhumbLine, PathType::GreatCircle] {
            assert_eq!(interpolate(path_type, 0.0, a, b), a);
            assert_eq!(interpolate(path_type, 1.0, a, b), b);
            assert_eq!(interpolate(path_type, -0.5, a, b), a);
            assert_eq!(interpolate(path_type, 1.5, a, b), b);
        }
    }

    #[test]
    fn linear_interpolation_is_arithmetic_mean() {
        let a = LatLon::from_degrees(10.0, 20.0);
        let b = LatLon::from_degrees(30.0, 60.0);
        assert_eq!(
            interpolate(PathType::Linear, 0.5, a, b),
            LatLon::from_degrees(20.0, 40.0)
        );
    }

    #[test]
    fn linear_interpolation_crosses_the_antimeridian() {
        let a = LatLon::from_degrees(0.0, 179.0);
        let b = LatLon::from_degrees(2.0, -179.0);
        let mid = interpolate(PathType::Linear, 0.5, a, b);
        assert_close(mid.latitude.degrees(), 1.0, 1e-12);
        assert_close(mid.longitude.degrees().abs(), 180.0, 1e-12);
        let quarter = interpolate(PathType::Linear, 0.25, b, a);
        assert_close(quarter.longitude.degrees(), -179.5, 1e-12);
    }

    #[test]
    fn linear_distance_wraps_longitude() {
        let a = LatLon::from_degrees(0.0, 179.0);
        let b = LatLon::from_degrees(0.0, -179.0);
        assert_close(linear_distance(a, b).degrees(), 2.0, 1e-9);
        assert_close(linear_azimuth(a, b).degrees(), 90.0, 1e-9);
    }

    #[test]
    fn parses_path_types() {
        assert_eq!("rhumb".parse::<PathType>(), Ok(PathType::RhumbLine));
        assert_eq!("Great-Circle".parse::<PathType>(), Ok(PathType::GreatCircle));
        assert!("spiral".parse::<PathType>().is_err());
    }
}
