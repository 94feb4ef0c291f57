use core::fmt;

use crate::angle::Angle;
use crate::latlon::LatLon;

/// An axis-aligned geographic box.
///
/// Invariant: `min_latitude <= max_latitude` and `min_longitude <= max_longitude`.
/// Sectors never wrap through the antimeridian; a region that does is
/// represented by two sectors (see [`Sector::split_wrapping_degrees`]).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sector {
    min_latitude: Angle,
    max_latitude: Angle,
    min_longitude: Angle,
    max_longitude: Angle,
}

impl Sector {
    pub const FULL_SPHERE: Sector = Sector {
        min_latitude: Angle::NEG90,
        max_latitude: Angle::POS90,
        min_longitude: Angle::NEG180,
        max_longitude: Angle::POS180,
    };

    pub fn new(
        min_latitude: Angle,
        max_latitude: Angle,
        min_longitude: Angle,
        max_longitude: Angle,
    ) -> Self {
        assert!(
            min_latitude.degrees() <= max_latitude.degrees(),
            "inverted sector latitudes: {min_latitude} > {max_latitude}"
        );
        assert!(
            min_longitude.degrees() <= max_longitude.degrees(),
            "inverted sector longitudes: {min_longitude} > {max_longitude}"
        );
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    pub fn from_degrees(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self::new(
            Angle::from_degrees(min_lat),
            Angle::from_degrees(max_lat),
            Angle::from_degrees(min_lon),
            Angle::from_degrees(max_lon),
        )
    }

    /// Builds the sectors covering `west..east`, splitting at the antimeridian
    /// when `west > east`.
    pub fn split_wrapping_degrees(min_lat: f64, max_lat: f64, west: f64, east: f64) -> Vec<Self> {
        if west <= east {
            vec![Self::from_degrees(min_lat, max_lat, west, east)]
        } else {
            vec![
                Self::from_degrees(min_lat, max_lat, west, 180.0),
                Self::from_degrees(min_lat, max_lat, -180.0, east),
            ]
        }
    }

    /// The smallest sector containing all `locations`, or `None` when empty.
    pub fn bounding_sector<I>(locations: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLon>,
    {
        let mut iter = locations.into_iter();
        let first = iter.next()?;
        let mut min_lat = first.latitude.degrees();
        let mut max_lat = min_lat;
        let mut min_lon = first.longitude.degrees();
        let mut max_lon = min_lon;
        for ll in iter {
            min_lat = min_lat.min(ll.latitude.degrees());
            max_lat = max_lat.max(ll.latitude.degrees());
            min_lon = min_lon.min(ll.longitude.degrees());
            max_lon = max_lon.max(ll.longitude.degrees());
        }
        Some(Self::from_degrees(min_lat, max_lat, min_lon, max_lon))
    }

    pub fn min_latitude(&self) -> Angle {
        self.min_latitude
    }

    pub fn max_latitude(&self) -> Angle {
        self.max_latitude
    }

    pub fn min_longitude(&self) -> Angle {
        self.min_longitude
    }

    pub fn max_longitude(&self) -> Angle {
        self.max_longitude
    }

    pub fn delta_lat(&self) -> Angle {
        self.max_latitude - self.min_latitude
    }

    pub fn delta_lon(&self) -> Angle {
        self.max_longitude - self.min_longitude
    }

    pub fn centroid(&self) -> LatLon {
        LatLon::new(
            Angle::average(self.min_latitude, self.max_latitude),
            Angle::average(self.min_longitude, self.max_longitude),
        )
    }

    /// Corners in SW, SE, NE, NW order.
    pub fn corners(&self) -> [LatLon; 4] {
        [
            LatLon::new(self.min_latitude, self.min_longitude),
            LatLon::new(self.min_latitude, self.max_longitude),
            LatLon::new(self.max_latitude, self.max_longitude),
            LatLon::new(self.max_latitude, self.min_longitude),
        ]
    }

    pub fn contains(&self, location: LatLon) -> bool {
        self.contains_degrees(location.latitude.degrees(), location.longitude.degrees())
    }

    pub fn contains_degrees(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_latitude.degrees()
            && lat <= self.max_latitude.degrees()
            && lon >= self.min_longitude.degrees()
            && lon <= self.max_longitude.degrees()
    }

    /// Closed-interval overlap test; sectors sharing only an edge intersect.
    pub fn intersects(&self, other: &Sector) -> bool {
        self.min_longitude.degrees() <= other.max_longitude.degrees()
            && self.max_longitude.degrees() >= other.min_longitude.degrees()
            && self.min_latitude.degrees() <= other.max_latitude.degrees()
            && self.max_latitude.degrees() >= other.min_latitude.degrees()
    }

    pub fn intersection(&self, other: &Sector) -> Option<Sector> {
        if !self.intersects(other) {
            return None;
        }
        Some(Sector::from_degrees(
            self.min_latitude.degrees().max(other.min_latitude.degrees()),
            self.max_latitude.degrees().min(other.max_latitude.degrees()),
            self.min_longitude.degrees().max(other.min_longitude.degrees()),
            self.max_longitude.degrees().min(other.max_longitude.degrees()),
        ))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}]",
            self.min_latitude, self.max_latitude, self.min_longitude, self.max_longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Sector;
    use crate::latlon::LatLon;

    #[test]
    fn contains_and_intersects_are_closed() {
        let a = Sector::from_degrees(0.0, 8.0, 0.0, 6.0);
        let b = Sector::from_degrees(0.0, 8.0, 6.0, 12.0);
        assert!(a.contains(LatLon::from_degrees(8.0, 6.0)));
        assert!(a.intersects(&b));
        assert_eq!(
            a.intersection(&b),
            Some(Sector::from_degrees(0.0, 8.0, 6.0, 6.0))
        );
    }

    #[test]
    fn centroid_is_box_middle() {
        let s = Sector::from_degrees(-8.0, 8.0, 0.0, 12.0);
        assert_eq!(s.centroid(), LatLon::from_degrees(0.0, 6.0));
    }

    #[test]
    fn bounding_sector_of_points() {
        let s = Sector::bounding_sector([
            LatLon::from_degrees(1.0, 5.0),
            LatLon::from_degrees(-2.0, 7.0),
            LatLon::from_degrees(3.0, 6.0),
        ])
        .unwrap();
        assert_eq!(s, Sector::from_degrees(-2.0, 3.0, 5.0, 7.0));
        assert!(Sector::bounding_sector(Vec::new()).is_none());
    }

    #[test]
    fn wrapping_region_splits_at_antimeridian() {
        let parts = Sector::split_wrapping_degrees(-10.0, 10.0, 170.0, -170.0);
        assert_eq!(
            parts,
            vec![
                Sector::from_degrees(-10.0, 10.0, 170.0, 180.0),
                Sector::from_degrees(-10.0, 10.0, -180.0, -170.0),
            ]
        );
        assert!(parts.iter().any(|s| s.contains(LatLon::from_degrees(0.0, 179.5))));
        assert!(parts.iter().any(|s| s.contains(LatLon::from_degrees(0.0, -179.5))));
        assert!(!parts.iter().any(|s| s.contains(LatLon::from_degrees(0.0, 0.0))));

        let single = Sector::split_wrapping_degrees(-10.0, 10.0, -5.0, 5.0);
        assert_eq!(single.len(), 1);
    }

    #[test]
    #[should_panic]
    fn inverted_sector_is_rejected() {
        let _ = Sector::from_degrees(10.0, 0.0, 0.0, 1.0);
    }
}
