use core::fmt;

use foundation::Angle;
use globe::Globe;

use crate::error::GridError;
use crate::tm::TransverseMercator;
use crate::utm::{Hemisphere, UtmCoord, central_meridian_degrees};

pub const BAND_LETTERS: &str = "CDEFGHJKLMNPQRSTUVWX";
const COLUMN_SETS: [&str; 3] = ["STUVWXYZ", "ABCDEFGH", "JKLMNPQR"];
const ROW_LETTERS: &str = "ABCDEFGHJKLMNPQRSTUV";
const POLAR_BANDS: &str = "ABYZ";
const SQUARE_SIZE: f64 = 100_000.0;
const ROW_CYCLE: f64 = 2_000_000.0;
pub const MAX_PRECISION: u8 = 5;

/// Latitude band letter for a latitude inside the UTM domain.
pub fn band_letter(lat_deg: f64) -> char {
    let idx = ((lat_deg + 80.0) / 8.0).floor().clamp(0.0, 19.0) as usize;
    BAND_LETTERS.as_bytes()[idx] as char
}

fn band_index(band: char) -> Option<usize> {
    BAND_LETTERS.find(band)
}

/// Two-letter identifier of the 100 km square holding a UTM coordinate.
pub fn square_id(zone: u8, easting: f64, northing: f64) -> Result<String, GridError> {
    if !(1..=60).contains(&zone) {
        return Err(GridError::InvalidZone(i64::from(zone)));
    }
    if !(crate::utm::MIN_EASTING..=crate::utm::MAX_EASTING).contains(&easting) {
        return Err(GridError::EastingOutOfRange(easting));
    }
    if !(0.0..=crate::utm::MAX_NORTHING).contains(&northing) {
        return Err(GridError::NorthingOutOfRange(northing));
    }
    let columns = COLUMN_SETS[usize::from(zone % 3)].as_bytes();
    let col = ((easting / SQUARE_SIZE).floor() as usize).saturating_sub(1).min(7);
    let offset = if zone % 2 == 0 { 5 } else { 0 };
    let row = ((northing / SQUARE_SIZE).floor() as usize + offset) % 20;
    let mut id = String::with_capacity(2);
    id.push(columns[col] as char);
    id.push(ROW_LETTERS.as_bytes()[row] as char);
    Ok(id)
}

/// A Military Grid Reference System coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct MgrsCoord {
    pub zone: u8,
    pub band: char,
    pub square: String,
    /// Easting within the 100 km square, truncated to `precision`.
    pub easting: f64,
    /// Northing within the 100 km square, truncated to `precision`.
    pub northing: f64,
    pub precision: u8,
    pub utm: UtmCoord,
}

impl MgrsCoord {
    pub fn from_lat_lon(lat: Angle, lon: Angle, globe: &Globe) -> Result<Self, GridError> {
        Self::from_lat_lon_with_precision(lat, lon, MAX_PRECISION, globe)
    }

    pub fn from_lat_lon_with_precision(
        lat: Angle,
        lon: Angle,
        precision: u8,
        globe: &Globe,
    ) -> Result<Self, GridError> {
        if precision > MAX_PRECISION {
            return Err(GridError::InvalidPrecision(precision));
        }
        let utm = UtmCoord::from_lat_lon(lat, lon, globe)?;
        let square = square_id(utm.zone, utm.easting, utm.northing)?;
        let step = resolution(precision);
        let truncate = |v: f64| ((v % SQUARE_SIZE) / step).floor() * step;
        Ok(Self {
            zone: utm.zone,
            band: band_letter(lat.degrees()),
            square,
            easting: truncate(utm.easting),
            northing: truncate(utm.northing),
            precision,
            utm,
        })
    }

    /// Parses references such as `"32VLM 88455 53097"` or `"32vlm8845553097"`.
    pub fn from_string(input: &str, globe: &Globe) -> Result<Self, GridError> {
        let invalid = |reason: &'static str| GridError::InvalidMgrs {
            input: input.to_string(),
            reason,
        };
        let text: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let chars: Vec<char> = text.chars().collect();

        let zone_len = chars.iter().take_while(|c| c.is_ascii_digit()).count();
        if zone_len == 0 {
            if chars.first().is_some_and(|c| POLAR_BANDS.contains(*c)) {
                return Err(invalid("polar (UPS) references are not supported"));
            }
            return Err(invalid("missing zone number"));
        }
        if zone_len > 2 {
            return Err(invalid("zone number has more than two digits"));
        }
        let zone: u8 = text[..zone_len]
            .parse()
            .map_err(|_| invalid("malformed zone number"))?;
        if !(1..=60).contains(&zone) {
            return Err(GridError::InvalidZone(i64::from(zone)));
        }

        let rest = &chars[zone_len..];
        if rest.len() < 3 {
            return Err(invalid("expected a band letter and a two-letter square id"));
        }
        let band = rest[0];
        if POLAR_BANDS.contains(band) {
            return Err(invalid("polar (UPS) references are not supported"));
        }
        let band_idx = band_index(band).ok_or_else(|| invalid("unknown latitude band"))?;

        let col_idx = COLUMN_SETS[usize::from(zone % 3)]
            .find(rest[1])
            .ok_or_else(|| invalid("column letter is not used in this zone"))?;
        let row_letter_idx = ROW_LETTERS
            .find(rest[2])
            .ok_or_else(|| invalid("unknown row letter"))?;

        let digits: String = rest[3..].iter().collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("trailing characters are not digits"));
        }
        if digits.len() % 2 != 0 || digits.len() > 2 * usize::from(MAX_PRECISION) {
            return Err(invalid("expected an even number of at most ten digits"));
        }
        let precision = (digits.len() / 2) as u8;
        let step = resolution(precision);
        let (east_digits, north_digits) = digits.split_at(digits.len() / 2);
        let parse_digits = |s: &str| -> Result<f64, GridError> {
            if s.is_empty() {
                return Ok(0.0);
            }
            s.parse::<u32>()
                .map(|v| f64::from(v) * step)
                .map_err(|_| invalid("malformed digits"))
        };
        let east_in_square = parse_digits(east_digits)?;
        let north_in_square = parse_digits(north_digits)?;

        let row_offset = if zone % 2 == 0 { 5 } else { 0 };
        let row_idx = (row_letter_idx + 20 - row_offset) % 20;
        let hemisphere = if band >= 'N' {
            Hemisphere::North
        } else {
            Hemisphere::South
        };
        let easting = (col_idx as f64 + 1.0) * SQUARE_SIZE + east_in_square;
        let mut northing = row_idx as f64 * SQUARE_SIZE + north_in_square;
        let band_min_lat = -80.0 + 8.0 * band_idx as f64;
        let floor = band_min_northing(zone, hemisphere, band_min_lat, globe) - SQUARE_SIZE;
        while northing < floor {
            northing += ROW_CYCLE;
        }

        let utm = UtmCoord::from_utm(zone, hemisphere, easting, northing, globe)?;
        Ok(Self {
            zone,
            band,
            square: format!("{}{}", rest[1], rest[2]),
            easting: east_in_square,
            northing: north_in_square,
            precision,
            utm,
        })
    }

    pub fn latitude(&self) -> Angle {
        self.utm.latitude
    }

    pub fn longitude(&self) -> Angle {
        self.utm.longitude
    }

    pub fn grid_zone_designator(&self) -> String {
        format!("{}{}", self.zone, self.band)
    }
}

impl fmt::Display for MgrsCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.zone, self.band, self.square)?;
        if self.precision > 0 {
            let step = resolution(self.precision);
            let width = usize::from(self.precision);
            let e = (self.easting / step).floor() as u32;
            let n = (self.northing / step).floor() as u32;
            write!(f, " {e:0width$} {n:0width$}")?;
        }
        Ok(())
    }
}

/// Size in meters of the last digit at `precision`.
fn resolution(precision: u8) -> f64 {
    10f64.powi(5 - i32::from(precision))
}

/// UTM northing of a band's southern parallel on the zone's central meridian.
fn band_min_northing(zone: u8, hemisphere: Hemisphere, lat_deg: f64, globe: &Globe) -> f64 {
    let cm = central_meridian_degrees(zone);
    let tm = TransverseMercator::utm(globe.ellipsoid(), cm, hemisphere == Hemisphere::South);
    tm.forward(lat_deg.to_radians(), cm.to_radians()).1
}

#[cfg(test)]
mod tests {
    use super::{MgrsCoord, band_letter, square_id};
    use crate::error::GridError;
    use foundation::Angle;
    use globe::Globe;
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn mgrs(lat: f64, lon: f64) -> Result<MgrsCoord, GridError> {
        MgrsCoord::from_lat_lon(Angle::from_degrees(lat), Angle::from_degrees(lon), &Globe::wgs84())
    }

    #[test]
    fn formats_known_references() {
        assert_eq!(mgrs(0.0, 3.0).unwrap().to_string(), "31NEA 00000 00000");
        let c = mgrs(60.0, 7.0).unwrap();
        assert_eq!(c.to_string(), "32VLM 88455 53097");
        assert_eq!(c.grid_zone_designator(), "32V");
    }

    #[test]
    fn precision_truncates_digits() {
        let globe = Globe::wgs84();
        let lat = Angle::from_degrees(60.0);
        let lon = Angle::from_degrees(7.0);
        let c = MgrsCoord::from_lat_lon_with_precision(lat, lon, 2, &globe).unwrap();
        assert_eq!(c.to_string(), "32VLM 88 53");
        let c = MgrsCoord::from_lat_lon_with_precision(lat, lon, 0, &globe).unwrap();
        assert_eq!(c.to_string(), "32VLM");
        assert_eq!(
            MgrsCoord::from_lat_lon_with_precision(lat, lon, 6, &globe),
            Err(GridError::InvalidPrecision(6))
        );
    }

    #[test]
    fn parses_with_and_without_spaces() {
        let globe = Globe::wgs84();
        let spaced = MgrsCoord::from_string("32VLM 88455 53097", &globe).unwrap();
        let packed = MgrsCoord::from_string("32vlm8845553097", &globe).unwrap();
        assert_eq!(spaced, packed);
        assert_eq!(spaced.to_string(), "32VLM 88455 53097");
        assert_close(spaced.utm.easting, 388_455.0, 1e-9);
        assert_close(spaced.utm.northing, 6_653_097.0, 1e-9);
        assert_close(spaced.latitude().degrees(), 60.0, 1e-4);
        assert_close(spaced.longitude().degrees(), 7.0, 1e-4);
    }

    #[test]
    fn parses_low_precision_and_southern_bands() {
        let globe = Globe::wgs84();
        let c = MgrsCoord::from_string("31NEA", &globe).unwrap();
        assert_eq!(c.precision, 0);
        assert_close(c.latitude().degrees(), 0.0, 1e-9);
        assert_close(c.longitude().degrees(), 3.0, 1e-9);

        let south = mgrs(-33.9, 151.2).unwrap();
        let back = MgrsCoord::from_string(&south.to_string(), &globe).unwrap();
        assert_close(back.latitude().degrees(), -33.9, 1e-4);
        assert_close(back.longitude().degrees(), 151.2, 1e-4);

        let far_south = mgrs(-79.5, -60.0).unwrap();
        let back = MgrsCoord::from_string(&far_south.to_string(), &globe).unwrap();
        assert_close(back.latitude().degrees(), -79.5, 1e-4);
    }

    #[test]
    fn rejects_polar_and_malformed_input() {
        let globe = Globe::wgs84();
        assert_eq!(mgrs(85.0, 0.0), Err(GridError::LatitudeOutOfRange(85.0)));
        assert!(matches!(
            MgrsCoord::from_string("ZGC 12345 12345", &globe),
            Err(GridError::InvalidMgrs { .. })
        ));
        assert!(matches!(
            MgrsCoord::from_string("32ALM", &globe),
            Err(GridError::InvalidMgrs { .. })
        ));
        assert!(matches!(
            MgrsCoord::from_string("32VLM 8845 530", &globe),
            Err(GridError::InvalidMgrs { .. })
        ));
        assert!(matches!(
            MgrsCoord::from_string("32VAM", &globe),
            Err(GridError::InvalidMgrs { .. })
        ));
        assert_eq!(
            MgrsCoord::from_string("61VLM", &globe),
            Err(GridError::InvalidZone(61))
        );
    }

    #[test]
    fn square_ids_follow_lettering_cycles() {
        assert_eq!(square_id(31, 500_000.0, 0.0).unwrap(), "EA");
        assert_eq!(square_id(32, 388_455.0, 6_653_097.0).unwrap(), "LM");
        assert_eq!(square_id(33, 100_000.0, 2_000_000.0).unwrap(), "SA");
        assert_eq!(square_id(31, 50_000.0, 0.0), Err(GridError::EastingOutOfRange(50_000.0)));
        assert_eq!(band_letter(84.0), 'X');
        assert_eq!(band_letter(-80.0), 'C');
        assert_eq!(band_letter(-0.5), 'M');
    }
}
