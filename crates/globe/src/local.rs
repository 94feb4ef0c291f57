use foundation::Angle;
use foundation::math::Vec3;

/// Local East-North-Up axes anchored at a model point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalFrame {
    pub origin: Vec3,
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl LocalFrame {
    /// Tangent frame of the ellipsoid at a geodetic location.
    pub fn geodetic(origin: Vec3, lat: Angle, lon: Angle) -> Self {
        let (sin_lat, cos_lat) = (lat.sin(), lat.cos());
        let (sin_lon, cos_lon) = (lon.sin(), lon.cos());
        Self {
            origin,
            east: Vec3::new(-sin_lon, cos_lon, 0.0),
            north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    /// Frame of a flat world: x east, y north, z up everywhere.
    pub fn flat(origin: Vec3) -> Self {
        Self {
            origin,
            east: Vec3::UNIT_X,
            north: Vec3::UNIT_Y,
            up: Vec3::UNIT_Z,
        }
    }

    /// Model point to `(east, north, up)` offsets in meters.
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.origin;
        Vec3::new(d.dot(self.east), d.dot(self.north), d.dot(self.up))
    }

    pub fn from_local(&self, enu: Vec3) -> Vec3 {
        self.origin + self.east * enu.x + self.north * enu.y + self.up * enu.z
    }
}
