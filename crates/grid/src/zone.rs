use core::fmt;

use foundation::{Angle, Sector};

use crate::mgrs::BAND_LETTERS;
use crate::utm::{Hemisphere, UTM_MAX_LATITUDE, UTM_MIN_LATITUDE};

pub const ZONE_ROWS: usize = 20;
pub const ZONE_COLUMNS: usize = 60;
pub const ZONE_CELLS: usize = ZONE_ROWS * ZONE_COLUMNS;

const NORWAY_ROW: usize = 17;
const SVALBARD_ROW: usize = 19;

/// One cell of the 60 × 20 UTM zone / latitude band grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneIndex {
    pub row: usize,
    pub col: usize,
}

impl ZoneIndex {
    /// `None` for cells outside the grid and for 32X, 34X and 36X.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        is_valid_cell(row, col).then_some(Self { row, col })
    }

    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::new(slot / ZONE_COLUMNS, slot % ZONE_COLUMNS)
    }

    /// Position in a row-major arena of [`ZONE_CELLS`] slots.
    pub fn slot(self) -> usize {
        self.row * ZONE_COLUMNS + self.col
    }

    /// Every valid cell in row-major order.
    pub fn all() -> impl Iterator<Item = ZoneIndex> {
        (0..ZONE_CELLS).filter_map(Self::from_slot)
    }

    /// Cell whose sector holds the location, irregular zones included.
    pub fn for_location(lat: Angle, lon: Angle) -> Option<Self> {
        let lat = lat.degrees();
        let lon = lon.degrees();
        if !(UTM_MIN_LATITUDE..=UTM_MAX_LATITUDE).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        let mut col = (((lon + 180.0) / 6.0).floor() as i64).clamp(0, 59) as usize;
        let row = (((lat + 80.0) / 8.0).floor() as i64).clamp(0, 19) as usize;
        if row == NORWAY_ROW && col == 30 && lon >= 3.0 {
            col = 31;
        }
        if row == SVALBARD_ROW {
            col = match col {
                31 if lon < 9.0 => 30,
                31 => 32,
                33 if lon < 21.0 => 32,
                33 => 34,
                35 if lon < 33.0 => 34,
                35 => 36,
                other => other,
            };
        }
        Self::new(row, col)
    }

    pub fn sector(self) -> Sector {
        let min_lat = UTM_MIN_LATITUDE + 8.0 * self.row as f64;
        let max_lat = if self.row == SVALBARD_ROW {
            UTM_MAX_LATITUDE
        } else {
            min_lat + 8.0
        };
        let (min_lon, max_lon) = match (self.row, self.col) {
            (NORWAY_ROW, 30) => (0.0, 3.0),
            (NORWAY_ROW, 31) => (3.0, 12.0),
            (SVALBARD_ROW, 30) => (0.0, 9.0),
            (SVALBARD_ROW, 32) => (9.0, 21.0),
            (SVALBARD_ROW, 34) => (21.0, 33.0),
            (SVALBARD_ROW, 36) => (33.0, 42.0),
            (_, col) => {
                let west = -180.0 + 6.0 * col as f64;
                (west, west + 6.0)
            }
        };
        Sector::from_degrees(min_lat, max_lat, min_lon, max_lon)
    }

    /// UTM zone number, 1..=60.
    pub fn zone_number(self) -> u8 {
        (self.col + 1) as u8
    }

    pub fn band(self) -> char {
        BAND_LETTERS.as_bytes()[self.row] as char
    }

    pub fn hemisphere(self) -> Hemisphere {
        if self.row >= 10 {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    /// Grid zone designator such as `"32V"`.
    pub fn name(self) -> String {
        format!("{}{}", self.zone_number(), self.band())
    }

    /// Cells of the next band up whose southern edge overlaps this cell's
    /// northern edge. Around Norway and Svalbard there can be two, and they
    /// need not line up with this cell.
    pub fn north_neighbors(self) -> Vec<ZoneIndex> {
        if self.row + 1 >= ZONE_ROWS {
            return Vec::new();
        }
        let a = self.sector();
        let (west, east) = (a.min_longitude(), a.max_longitude());
        (self.col.saturating_sub(1)..=(self.col + 1).min(ZONE_COLUMNS - 1))
            .filter_map(|col| Self::new(self.row + 1, col))
            .filter(|other| {
                let b = other.sector();
                b.min_longitude() < east && b.max_longitude() > west
            })
            .collect()
    }

    /// The next cell eastward sharing this cell's whole eastern edge; column
    /// 59 wraps to column 0.
    pub fn east_neighbor(self) -> Option<ZoneIndex> {
        let a = self.sector();
        let other = (1..=2)
            .map(|step| (self.col + step) % ZONE_COLUMNS)
            .find_map(|col| Self::new(self.row, col))?;
        let b = other.sector();
        let east = a.max_longitude().degrees();
        let west = b.min_longitude().degrees();
        let touching = east == west || (east == 180.0 && west == -180.0);
        let same_span = a.min_latitude() == b.min_latitude() && a.max_latitude() == b.max_latitude();
        (touching && same_span).then_some(other)
    }
}

impl fmt::Display for ZoneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

pub fn is_valid_cell(row: usize, col: usize) -> bool {
    row < ZONE_ROWS && col < ZONE_COLUMNS && !(row == SVALBARD_ROW && matches!(col, 31 | 33 | 35))
}

/// Cells intersecting `sector` in (row, col) order.
///
/// The candidate columns are widened by one on each side so that the
/// irregular Norway and Svalbard cells are not missed.
pub fn zones_for_sector(sector: &Sector) -> Vec<ZoneIndex> {
    let min_lat = sector.min_latitude().degrees();
    let max_lat = sector.max_latitude().degrees();
    if max_lat < UTM_MIN_LATITUDE || min_lat > UTM_MAX_LATITUDE {
        return Vec::new();
    }
    let row_of = |lat: f64| (((lat + 80.0) / 8.0).floor() as i64).clamp(0, 19) as usize;
    let col_of = |lon: f64| (((lon + 180.0) / 6.0).floor() as i64).clamp(0, 59) as usize;
    let rows = row_of(min_lat)..=row_of(max_lat);
    let first_col = col_of(sector.min_longitude().degrees()).saturating_sub(1);
    let last_col = (col_of(sector.max_longitude().degrees()) + 1).min(ZONE_COLUMNS - 1);

    let mut zones = Vec::new();
    for row in rows {
        for col in first_col..=last_col {
            if let Some(zone) = ZoneIndex::new(row, col) {
                if zone.sector().intersects(sector) {
                    zones.push(zone);
                }
            }
        }
    }
    zones
}

#[cfg(test)]
mod tests {
    use super::{ZONE_CELLS, ZoneIndex, zones_for_sector};
    use crate::utm::Hemisphere;
    use foundation::{Angle, Sector};

    fn at(lat: f64, lon: f64) -> ZoneIndex {
        ZoneIndex::for_location(Angle::from_degrees(lat), Angle::from_degrees(lon)).unwrap()
    }

    #[test]
    fn grid_has_1197_cells() {
        assert_eq!(ZoneIndex::all().count(), 1197);
        assert!(ZoneIndex::new(19, 31).is_none());
        assert!(ZoneIndex::new(19, 33).is_none());
        assert!(ZoneIndex::new(19, 35).is_none());
        assert!(ZoneIndex::new(20, 0).is_none());
        assert!(ZoneIndex::from_slot(ZONE_CELLS).is_none());
    }

    #[test]
    fn cells_tile_without_overlap() {
        let total: f64 = ZoneIndex::all()
            .map(|z| {
                let s = z.sector();
                s.delta_lat().degrees() * s.delta_lon().degrees()
            })
            .sum();
        assert!((total - 164.0 * 360.0).abs() < 1e-6, "area {total}");
    }

    #[test]
    fn irregular_cells() {
        assert_eq!(at(60.0, 7.0).name(), "32V");
        assert_eq!(at(60.0, 4.0).name(), "32V");
        assert_eq!(at(60.0, 2.0).name(), "31V");
        assert_eq!(at(78.0, 33.0).name(), "37X");
        assert_eq!(at(78.0, 10.0).name(), "33X");
        assert_eq!(at(78.0, 5.0).name(), "31X");
        assert_eq!(at(78.0, 30.0).name(), "35X");
        assert_eq!(at(84.0, 0.0).name(), "31X");
        assert_eq!(at(60.0, 7.0).sector(), Sector::from_degrees(56.0, 64.0, 3.0, 12.0));
        assert_eq!(at(78.0, 33.0).sector(), Sector::from_degrees(72.0, 84.0, 33.0, 42.0));
        for lat in [72.0, 76.0, 83.9] {
            for lon in (0..42).map(f64::from) {
                let name = at(lat, lon).name();
                assert!(!["32X", "34X", "36X"].contains(&name.as_str()), "{name}");
            }
        }
    }

    #[test]
    fn domain_and_antimeridian() {
        assert!(ZoneIndex::for_location(Angle::from_degrees(84.5), Angle::ZERO).is_none());
        assert!(ZoneIndex::for_location(Angle::from_degrees(-80.5), Angle::ZERO).is_none());
        assert_eq!(at(0.0, 180.0).zone_number(), 60);
        assert_eq!(at(0.0, -180.0).zone_number(), 1);
        assert_eq!(at(-0.5, 0.0).hemisphere(), Hemisphere::South);
        assert_eq!(at(0.0, 0.0).name(), "31N");
    }

    #[test]
    fn neighbors_share_whole_edges() {
        let z32v = at(60.0, 7.0);
        assert_eq!(z32v.east_neighbor(), Some(at(60.0, 13.0)));
        assert_eq!(at(60.0, 1.0).east_neighbor(), Some(z32v));
        assert_eq!(at(78.0, 5.0).east_neighbor(), Some(at(78.0, 10.0)));
        assert_eq!(at(0.0, 179.0).east_neighbor(), Some(at(0.0, -179.0)));
    }

    #[test]
    fn north_neighbors_follow_irregular_cells() {
        let names = |z: ZoneIndex| -> Vec<String> {
            z.north_neighbors().into_iter().map(ZoneIndex::name).collect()
        };
        assert_eq!(names(at(52.0, 1.0)), vec!["31V", "32V"]);
        assert_eq!(names(at(52.0, 7.0)), vec!["32V"]);
        assert_eq!(names(at(52.0, 13.0)), vec!["33V"]);
        assert_eq!(names(at(60.0, 1.0)), vec!["31W"]);
        assert_eq!(names(at(60.0, 7.0)), vec!["31W", "32W"]);
        assert_eq!(names(at(68.0, 7.0)), vec!["31X", "33X"]);
        assert_eq!(names(at(68.0, 19.0)), vec!["33X", "35X"]);
        assert_eq!(names(at(68.0, 37.0)), vec!["37X"]);
        assert_eq!(names(at(68.0, -177.0)), vec!["1X"]);
        assert!(names(at(78.0, 5.0)).is_empty());
    }

    #[test]
    fn sector_lookup_widens_and_filters() {
        let zones = zones_for_sector(&Sector::from_degrees(57.0, 58.0, 4.0, 5.0));
        assert_eq!(zones.iter().map(|z| z.name()).collect::<Vec<_>>(), vec!["32V"]);

        let zones = zones_for_sector(&Sector::from_degrees(-1.0, 1.0, -1.0, 1.0));
        let names: Vec<_> = zones.iter().map(|z| z.name()).collect();
        assert_eq!(names, vec!["30M", "31M", "30N", "31N"]);

        assert!(zones_for_sector(&Sector::from_degrees(85.0, 90.0, -180.0, 180.0)).is_empty());
        assert_eq!(zones_for_sector(&Sector::FULL_SPHERE).len(), 1197);
    }
}
