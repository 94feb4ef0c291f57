use core::fmt;

use foundation::{Angle, LatLon, normalized_degrees_longitude};
use globe::Globe;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::tm::TransverseMercator;

pub const UTM_MIN_LATITUDE: f64 = -80.0;
pub const UTM_MAX_LATITUDE: f64 = 84.0;
pub const MIN_EASTING: f64 = 100_000.0;
pub const MAX_EASTING: f64 = 900_000.0;
pub const MIN_NORTHING: f64 = 0.0;
pub const MAX_NORTHING: f64 = 10_000_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    pub fn from_latitude(lat: Angle) -> Self {
        if lat.degrees() < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            _ => None,
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Central meridian of a UTM zone in degrees.
pub fn central_meridian_degrees(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// UTM zone number covering a location, with the Norway and Svalbard
/// exceptions applied.
pub fn zone_number_for(lat: f64, lon: f64) -> u8 {
    let mut zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8;
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        zone = 32;
    }
    if lat >= 72.0 {
        if (0.0..9.0).contains(&lon) {
            zone = 31;
        } else if (9.0..21.0).contains(&lon) {
            zone = 33;
        } else if (21.0..33.0).contains(&lon) {
            zone = 35;
        } else if (33.0..42.0).contains(&lon) {
            zone = 37;
        }
    }
    zone
}

fn check_zone(zone: u8) -> Result<(), GridError> {
    if (1..=60).contains(&zone) {
        Ok(())
    } else {
        Err(GridError::InvalidZone(i64::from(zone)))
    }
}

fn check_lat_lon(lat: Angle, lon: Angle) -> Result<(), GridError> {
    let lat_deg = lat.degrees();
    if !(UTM_MIN_LATITUDE..=UTM_MAX_LATITUDE).contains(&lat_deg) {
        return Err(GridError::LatitudeOutOfRange(lat_deg));
    }
    if !lon.is_valid_longitude() {
        return Err(GridError::LongitudeOutOfRange(lon.degrees()));
    }
    Ok(())
}

/// A location in Universal Transverse Mercator coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UtmCoord {
    pub zone: u8,
    pub hemisphere: Hemisphere,
    pub easting: f64,
    pub northing: f64,
    pub latitude: Angle,
    pub longitude: Angle,
}

impl UtmCoord {
    pub fn from_lat_lon(lat: Angle, lon: Angle, globe: &Globe) -> Result<Self, GridError> {
        check_lat_lon(lat, lon)?;
        let zone = zone_number_for(lat.degrees(), lon.degrees());
        Self::project(lat, lon, zone, Hemisphere::from_latitude(lat), globe)
    }

    /// Projects into `zone` regardless of which zone covers the location.
    pub fn from_lat_lon_in_zone(
        lat: Angle,
        lon: Angle,
        zone: u8,
        hemisphere: Hemisphere,
        globe: &Globe,
    ) -> Result<Self, GridError> {
        check_lat_lon(lat, lon)?;
        check_zone(zone)?;
        Self::project(lat, lon, zone, hemisphere, globe)
    }

    fn project(
        lat: Angle,
        lon: Angle,
        zone: u8,
        hemisphere: Hemisphere,
        globe: &Globe,
    ) -> Result<Self, GridError> {
        let tm = zone_projection(zone, hemisphere, globe);
        let (easting, northing) = tm.forward(lat.radians(), lon.radians());
        Ok(Self {
            zone,
            hemisphere,
            easting,
            northing,
            latitude: lat,
            longitude: lon,
        })
    }

    pub fn from_utm(
        zone: u8,
        hemisphere: Hemisphere,
        easting: f64,
        northing: f64,
        globe: &Globe,
    ) -> Result<Self, GridError> {
        let (lat, lon) = utm_to_lat_lon_unwrapped(zone, hemisphere, easting, northing, globe)?;
        Ok(Self {
            zone,
            hemisphere,
            easting,
            northing,
            latitude: lat,
            longitude: Angle::from_degrees(normalized_degrees_longitude(lon.degrees())),
        })
    }

    pub fn lat_lon(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    pub fn central_meridian(&self) -> Angle {
        Angle::from_degrees(central_meridian_degrees(self.zone))
    }
}

impl fmt::Display for UtmCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.0}E {:.0}N",
            self.zone, self.hemisphere, self.easting, self.northing
        )
    }
}

fn zone_projection(zone: u8, hemisphere: Hemisphere, globe: &Globe) -> TransverseMercator {
    TransverseMercator::utm(
        globe.ellipsoid(),
        central_meridian_degrees(zone),
        hemisphere == Hemisphere::South,
    )
}

/// Inverse UTM keeping the longitude continuous around the zone's central
/// meridian, so zones 1 and 60 can report values just beyond ±180.
pub(crate) fn utm_to_lat_lon_unwrapped(
    zone: u8,
    hemisphere: Hemisphere,
    easting: f64,
    northing: f64,
    globe: &Globe,
) -> Result<(Angle, Angle), GridError> {
    check_zone(zone)?;
    if !(MIN_EASTING..=MAX_EASTING).contains(&easting) {
        return Err(GridError::EastingOutOfRange(easting));
    }
    if !(MIN_NORTHING..=MAX_NORTHING).contains(&northing) {
        return Err(GridError::NorthingOutOfRange(northing));
    }
    let (lat, lon) = zone_projection(zone, hemisphere, globe).inverse(easting, northing);
    Ok((Angle::from_radians(lat), Angle::from_radians(lon)))
}

#[cfg(test)]
mod tests {
    use super::{Hemisphere, UtmCoord, zone_number_for};
    use crate::error::GridError;
    use foundation::Angle;
    use globe::Globe;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn utm(lat: f64, lon: f64) -> Result<UtmCoord, GridError> {
        UtmCoord::from_lat_lon(Angle::from_degrees(lat), Angle::from_degrees(lon), &Globe::wgs84())
    }

    #[test]
    fn equator_on_central_meridian() {
        let c = utm(0.0, 3.0).unwrap();
        assert_eq!(c.zone, 31);
        assert_eq!(c.hemisphere, Hemisphere::North);
        assert_eq!(c.easting, 500_000.0);
        assert_eq!(c.northing, 0.0);
        assert_eq!(c.to_string(), "31 N 500000E 0N");
    }

    #[test]
    fn norway_location_uses_zone_32() {
        let c = utm(60.0, 7.0).unwrap();
        assert_eq!(c.zone, 32);
        assert_close(c.easting, 388_455.958, 1.0);
        assert_close(c.northing, 6_653_097.436, 1.0);
        assert_eq!(utm(60.0, 4.0).unwrap().zone, 32);
        assert_eq!(utm(60.0, 2.0).unwrap().zone, 31);
        assert_eq!(utm(64.0, 4.0).unwrap().zone, 31);
    }

    #[test]
    fn svalbard_zones() {
        assert_eq!(zone_number_for(78.0, 5.0), 31);
        assert_eq!(zone_number_for(78.0, 10.0), 33);
        assert_eq!(zone_number_for(78.0, 25.0), 35);
        assert_eq!(zone_number_for(78.0, 33.0), 37);
        assert_eq!(zone_number_for(78.0, 42.0), 38);
        assert_eq!(zone_number_for(71.9, 10.0), 32);
    }

    #[test]
    fn antimeridian_zones() {
        assert_eq!(zone_number_for(0.0, 180.0), 60);
        assert_eq!(zone_number_for(0.0, -180.0), 1);
        assert_eq!(zone_number_for(0.0, 179.999), 60);
    }

    #[test]
    fn round_trip_through_utm() {
        let globe = Globe::wgs84();
        for (lat, lon) in [(47.5, 8.25), (-33.9, 151.2), (83.9, 38.0), (-79.9, -177.5)] {
            let c = utm(lat, lon).unwrap();
            let back = UtmCoord::from_utm(c.zone, c.hemisphere, c.easting, c.northing, &globe).unwrap();
            assert_close(back.latitude.degrees(), lat, 1e-6);
            assert_close(back.longitude.degrees(), lon, 1e-6);
        }
    }

    #[test]
    fn forced_zone_projects_outside_its_strip() {
        let globe = Globe::wgs84();
        let c = UtmCoord::from_lat_lon_in_zone(
            Angle::from_degrees(56.0),
            Angle::from_degrees(3.0),
            32,
            Hemisphere::North,
            &globe,
        )
        .unwrap();
        assert_eq!(c.zone, 32);
        assert_close(c.easting, 126_049.970, 1.0);
    }

    #[test]
    fn domain_errors() {
        let globe = Globe::wgs84();
        assert_eq!(utm(84.5, 0.0), Err(GridError::LatitudeOutOfRange(84.5)));
        assert_eq!(utm(-80.5, 0.0), Err(GridError::LatitudeOutOfRange(-80.5)));
        assert_eq!(utm(0.0, 181.0), Err(GridError::LongitudeOutOfRange(181.0)));
        assert_eq!(
            UtmCoord::from_utm(61, Hemisphere::North, 500_000.0, 0.0, &globe),
            Err(GridError::InvalidZone(61))
        );
        assert_eq!(
            UtmCoord::from_utm(0, Hemisphere::North, 500_000.0, 0.0, &globe),
            Err(GridError::InvalidZone(0))
        );
        assert_eq!(
            UtmCoord::from_utm(31, Hemisphere::North, 99_999.0, 0.0, &globe),
            Err(GridError::EastingOutOfRange(99_999.0))
        );
        assert_eq!(
            UtmCoord::from_utm(31, Hemisphere::South, 500_000.0, 10_000_001.0, &globe),
            Err(GridError::NorthingOutOfRange(10_000_001.0))
        );
    }

    #[test]
    fn hemisphere_chars() {
        assert_eq!(Hemisphere::from_char('s'), Some(Hemisphere::South));
        assert_eq!(Hemisphere::from_char('x'), None);
        assert_eq!(Hemisphere::from_latitude(Angle::from_degrees(-0.1)), Hemisphere::South);
    }
}
