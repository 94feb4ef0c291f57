use core::fmt;

use crate::angle::Angle;

/// A geographic location: latitude and longitude.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLon {
    pub latitude: Angle,
    pub longitude: Angle,
}

impl LatLon {
    pub const ZERO: LatLon = LatLon {
        latitude: Angle::ZERO,
        longitude: Angle::ZERO,
    };

    pub fn new(latitude: Angle, longitude: Angle) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self::new(Angle::from_degrees(latitude), Angle::from_degrees(longitude))
    }

    pub fn from_radians(latitude: f64, longitude: f64) -> Self {
        Self::new(Angle::from_radians(latitude), Angle::from_radians(longitude))
    }

    pub fn normalized(self) -> Self {
        Self::new(
            self.latitude.normalized_latitude(),
            self.longitude.normalized_longitude(),
        )
    }

    pub fn is_valid(self) -> bool {
        self.latitude.is_valid_latitude() && self.longitude.is_valid_longitude()
    }

    pub fn with_elevation(self, elevation: f64) -> Position {
        Position::from_lat_lon(self, elevation)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A location plus an elevation in meters relative to the globe's reference surface.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Position {
    pub latitude: Angle,
    pub longitude: Angle,
    pub elevation: f64,
}

impl Position {
    pub fn new(latitude: Angle, longitude: Angle, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    pub fn from_degrees(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self::new(
            Angle::from_degrees(latitude),
            Angle::from_degrees(longitude),
            elevation,
        )
    }

    pub fn from_lat_lon(location: LatLon, elevation: f64) -> Self {
        Self::new(location.latitude, location.longitude, elevation)
    }

    pub fn lat_lon(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}

impl From<Position> for LatLon {
    fn from(position: Position) -> Self {
        position.lat_lon()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}m)",
            self.latitude, self.longitude, self.elevation
        )
    }
}
