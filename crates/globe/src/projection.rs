use core::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use core::fmt;
use core::str::FromStr;

use foundation::math::Vec3;
use foundation::{Angle, Position};
use serde::{Deserialize, Serialize};

use crate::error::GlobeError;

/// Mercator latitudes are clamped to this limit before projecting.
pub const MERCATOR_LATITUDE_LIMIT_DEGREES: f64 = 75.0;

/// Exponent of the modified-sinusoidal compromise projection.
const MODIFIED_SINUSOIDAL_EXPONENT: f64 = 0.3;

/// Shape of the world: the ellipsoid or one of the flat map projections.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Projection {
    #[default]
    Ellipsoidal,
    PlateCarree,
    Mercator,
    Sinusoidal,
    ModifiedSinusoidal,
}

impl Projection {
    pub const ALL: [Projection; 5] = [
        Projection::Ellipsoidal,
        Projection::PlateCarree,
        Projection::Mercator,
        Projection::Sinusoidal,
        Projection::ModifiedSinusoidal,
    ];

    pub fn is_flat(self) -> bool {
        !matches!(self, Projection::Ellipsoidal)
    }

    pub fn name(self) -> &'static str {
        match self {
            Projection::Ellipsoidal => "ellipsoidal",
            Projection::PlateCarree => "plate-carree",
            Projection::Mercator => "mercator",
            Projection::Sinusoidal => "sinusoidal",
            Projection::ModifiedSinusoidal => "modified-sinusoidal",
        }
    }

    /// Largest latitude the projection can represent, in degrees.
    pub fn latitude_limit_degrees(self) -> f64 {
        match self {
            Projection::Mercator => MERCATOR_LATITUDE_LIMIT_DEGREES,
            _ => 90.0,
        }
    }

    /// Projects onto the plane `z = elevation` of a flat world with radius `r`.
    ///
    /// `None` for [`Projection::Ellipsoidal`], which has no plane.
    pub fn project_flat(self, lat: Angle, lon: Angle, elevation: f64, r: f64) -> Option<Vec3> {
        let lon_rad = lon.radians();
        let point = match self {
            Projection::Ellipsoidal => return None,
            Projection::PlateCarree => Vec3::new(r * lon_rad, r * lat.radians(), elevation),
            Projection::Mercator => {
                let limit = Angle::from_degrees(MERCATOR_LATITUDE_LIMIT_DEGREES);
                let lat = lat.clamp(-limit, limit);
                let y = r * (FRAC_PI_4 + lat.radians() / 2.0).tan().ln();
                Vec3::new(r * lon_rad, y, elevation)
            }
            Projection::Sinusoidal => {
                Vec3::new(r * lon_rad * lat.cos(), r * lat.radians(), elevation)
            }
            Projection::ModifiedSinusoidal => {
                let scale = lat.cos().abs().powf(MODIFIED_SINUSOIDAL_EXPONENT);
                Vec3::new(r * lon_rad * scale, r * lat.radians(), elevation)
            }
        };
        Some(point)
    }

    /// Exact inverse of [`Projection::project_flat`].
    pub fn unproject_flat(self, point: Vec3, r: f64) -> Option<Position> {
        let (lat, lon) = match self {
            Projection::Ellipsoidal => return None,
            Projection::PlateCarree => (point.y / r, point.x / r),
            Projection::Mercator => {
                let lat = FRAC_PI_2 - 2.0 * (-point.y / r).exp().atan();
                (lat, point.x / r)
            }
            Projection::Sinusoidal => {
                let lat = point.y / r;
                let c = lat.cos();
                let lon = if c.abs() > 1e-12 { point.x / (r * c) } else { 0.0 };
                (lat, lon)
            }
            Projection::ModifiedSinusoidal => {
                let lat = point.y / r;
                let c = lat.cos().abs().powf(MODIFIED_SINUSOIDAL_EXPONENT);
                let lon = if c > 1e-12 { point.x / (r * c) } else { 0.0 };
                (lat, lon)
            }
        };
        Some(Position::new(Angle::from_radians(lat), Angle::from_radians(lon), point.z))
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Projection {
    type Err = GlobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "ellipsoidal" | "round" => Ok(Projection::Ellipsoidal),
            "plate-carree" | "lat-lon" => Ok(Projection::PlateCarree),
            "mercator" => Ok(Projection::Mercator),
            "sinusoidal" => Ok(Projection::Sinusoidal),
            "modified-sinusoidal" => Ok(Projection::ModifiedSinusoidal),
            _ => Err(GlobeError::UnknownProjection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MERCATOR_LATITUDE_LIMIT_DEGREES, Projection};
    use foundation::Angle;
    use foundation::math::{Vec3, WGS84_A};

    fn assert_rel_close(a: f64, b: f64, rel: f64) {
        let scale = a.abs().max(b.abs()).max(1.0);
        let diff = (a - b).abs();
        assert!(diff <= rel * scale, "expected {a} ~= {b} (diff {diff})");
    }

    fn flat() -> [Projection; 4] {
        [
            Projection::PlateCarree,
            Projection::Mercator,
            Projection::Sinusoidal,
            Projection::ModifiedSinusoidal,
        ]
    }

    #[test]
    fn flat_round_trip_within_domain() {
        for projection in flat() {
            let limit = projection.latitude_limit_degrees();
            for lat in [-74.5_f64, -45.0, -10.25, 0.0, 33.3, 60.0, 74.9] {
                if lat.abs() > limit {
                    continue;
                }
                for lon in [-179.5, -90.0, 0.0, 12.75, 179.9] {
                    let p = projection.project_flat(
                        Angle::from_degrees(lat),
                        Angle::from_degrees(lon),
                        1234.5,
                        WGS84_A,
                    ).unwrap();
                    let back = projection.unproject_flat(p, WGS84_A).unwrap();
                    assert_rel_close(back.latitude.degrees(), lat, 1e-6);
                    assert_rel_close(back.longitude.degrees(), lon, 1e-6);
                    assert_eq!(back.elevation, 1234.5);
                }
            }
        }
    }

    #[test]
    fn mercator_clamps_near_pole() {
        let lon = Angle::from_degrees(20.0);
        let at_89 = Projection::Mercator.project_flat(Angle::from_degrees(89.0), lon, 0.0, WGS84_A).unwrap();
        let at_75 = Projection::Mercator.project_flat(
            Angle::from_degrees(MERCATOR_LATITUDE_LIMIT_DEGREES),
            lon,
            0.0,
            WGS84_A,
        ).unwrap();
        assert_eq!(at_89, at_75);
        let south = Projection::Mercator.project_flat(Angle::from_degrees(-89.0), lon, 0.0, WGS84_A).unwrap();
        assert_rel_close(south.y, -at_75.y, 1e-12);
        let back = Projection::Mercator.unproject_flat(at_89, WGS84_A).unwrap();
        assert_rel_close(back.latitude.degrees(), 75.0, 1e-9);
    }

    #[test]
    fn plate_carree_scales_radians() {
        let p = Projection::PlateCarree.project_flat(
            Angle::from_degrees(90.0),
            Angle::from_degrees(180.0),
            5.0,
            2.0,
        ).unwrap();
        assert_rel_close(p.x, 2.0 * core::f64::consts::PI, 1e-15);
        assert_rel_close(p.y, core::f64::consts::PI, 1e-15);
        assert_eq!(p.z, 5.0);
    }

    #[test]
    fn sinusoidal_narrows_with_latitude() {
        let lon = Angle::from_degrees(90.0);
        let eq = Projection::Sinusoidal.project_flat(Angle::ZERO, lon, 0.0, 1.0).unwrap();
        let mid = Projection::Sinusoidal.project_flat(Angle::from_degrees(60.0), lon, 0.0, 1.0).unwrap();
        assert_rel_close(mid.x, eq.x * 0.5, 1e-12);
        let modified =
            Projection::ModifiedSinusoidal.project_flat(Angle::from_degrees(60.0), lon, 0.0, 1.0).unwrap();
        assert!(modified.x > mid.x && modified.x < eq.x);
    }

    #[test]
    fn ellipsoidal_has_no_plane() {
        let p = Projection::Ellipsoidal.project_flat(Angle::ZERO, Angle::ZERO, 0.0, WGS84_A);
        assert!(p.is_none());
        let back = Projection::Ellipsoidal.unproject_flat(Vec3::new(WGS84_A, 0.0, 0.0), WGS84_A);
        assert!(back.is_none());
    }

    #[test]
    fn pole_inverse_is_defined() {
        let p = Projection::Sinusoidal.project_flat(Angle::POS90, Angle::from_degrees(40.0), 0.0, 1.0).unwrap();
        let back = Projection::Sinusoidal.unproject_flat(p, 1.0).unwrap();
        assert_rel_close(back.latitude.degrees(), 90.0, 1e-12);
        assert_eq!(back.longitude.degrees(), 0.0);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Mercator".parse::<Projection>().unwrap(), Projection::Mercator);
        assert_eq!(
            "modified_sinusoidal".parse::<Projection>().unwrap(),
            Projection::ModifiedSinusoidal
        );
        for p in Projection::ALL {
            assert_eq!(p.name().parse::<Projection>().unwrap(), p);
        }
        assert!("robinson".parse::<Projection>().is_err());
    }
}
