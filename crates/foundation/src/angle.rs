use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// An immutable angle carrying both its degree and radian representation.
///
/// The raw value is not normalized; use [`Angle::normalized_latitude`] or
/// [`Angle::normalized_longitude`] when a canonical range is required.
#[derive(Debug, Copy, Clone)]
pub struct Angle {
    degrees: f64,
    radians: f64,
}

const DEGREES_TO_RADIANS: f64 = core::f64::consts::PI / 180.0;
const RADIANS_TO_DEGREES: f64 = 180.0 / core::f64::consts::PI;

impl Angle {
    pub const ZERO: Angle = Angle::from_degrees_const(0.0);
    pub const POS90: Angle = Angle::from_degrees_const(90.0);
    pub const NEG90: Angle = Angle::from_degrees_const(-90.0);
    pub const POS180: Angle = Angle::from_degrees_const(180.0);
    pub const NEG180: Angle = Angle::from_degrees_const(-180.0);
    pub const POS360: Angle = Angle::from_degrees_const(360.0);

    const fn from_degrees_const(degrees: f64) -> Self {
        Self {
            degrees,
            radians: degrees * DEGREES_TO_RADIANS,
        }
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            degrees,
            radians: degrees * DEGREES_TO_RADIANS,
        }
    }

    pub fn from_radians(radians: f64) -> Self {
        Self {
            degrees: radians * RADIANS_TO_DEGREES,
            radians,
        }
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.degrees
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.radians
    }

    pub fn sin(self) -> f64 {
        self.radians.sin()
    }

    pub fn cos(self) -> f64 {
        self.radians.cos()
    }

    pub fn tan(self) -> f64 {
        self.radians.tan()
    }

    pub fn tan_half_angle(self) -> f64 {
        (0.5 * self.radians).tan()
    }

    pub fn abs(self) -> Self {
        Self::from_degrees(self.degrees.abs())
    }

    pub fn average(a: Angle, b: Angle) -> Self {
        Self::from_degrees(0.5 * (a.degrees + b.degrees))
    }

    pub fn clamp(self, min: Angle, max: Angle) -> Self {
        assert!(min.degrees <= max.degrees, "inverted clamp range");
        if self.degrees < min.degrees {
            min
        } else if self.degrees > max.degrees {
            max
        } else {
            self
        }
    }

    /// Linear interpolation between two angles without wrapping.
    pub fn mix(t: f64, a: Angle, b: Angle) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }
        Self::from_degrees(a.degrees + t * (b.degrees - a.degrees))
    }

    /// Latitude in [-90, 90], reflecting values that run over a pole.
    pub fn normalized_latitude(self) -> Self {
        Self::from_degrees(normalized_degrees_latitude(self.degrees))
    }

    /// Longitude in [-180, 180].
    pub fn normalized_longitude(self) -> Self {
        Self::from_degrees(normalized_degrees_longitude(self.degrees))
    }

    pub fn is_valid_latitude(self) -> bool {
        (-90.0..=90.0).contains(&self.degrees)
    }

    pub fn is_valid_longitude(self) -> bool {
        (-180.0..=180.0).contains(&self.degrees)
    }

    /// Formats as `d° m’ s.ss”` with a leading minus sign for negative angles.
    pub fn to_dms_string(self) -> String {
        let sign = if self.degrees < 0.0 { "-" } else { "" };
        let total = self.degrees.abs();
        let mut d = total.floor();
        let mut m = ((total - d) * 60.0).floor();
        let mut s = ((total - d) * 60.0 - m) * 60.0;
        // Rounding to two decimals can push seconds or minutes to 60.
        if (s * 100.0).round() >= 6000.0 {
            s = 0.0;
            m += 1.0;
        }
        if m >= 60.0 {
            m = 0.0;
            d += 1.0;
        }
        format!("{sign}{d}\u{00b0} {m}\u{2019} {s:.2}\u{201d}")
    }
}

pub fn normalized_degrees_latitude(degrees: f64) -> f64 {
    let lat = degrees % 180.0;
    let normalized = if lat > 90.0 {
        180.0 - lat
    } else if lat < -90.0 {
        -180.0 - lat
    } else {
        lat
    };
    // -0.0 and 0.0 compare equal but print differently.
    if normalized == 0.0 { 0.0 } else { normalized }
}

pub fn normalized_degrees_longitude(degrees: f64) -> f64 {
    let lon = degrees % 360.0;
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        360.0 + lon
    } else {
        lon
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        self.degrees == other.degrees
    }
}

impl PartialOrd for Angle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.degrees.partial_cmp(&other.degrees)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::from_degrees(self.degrees + other.degrees)
    }
}

impl Sub for Angle {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::from_degrees(self.degrees - other.degrees)
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            degrees: -self.degrees,
            radians: -self.radians,
        }
    }
}

impl Mul<f64> for Angle {
    type Output = Self;

    fn mul(self, factor: f64) -> Self::Output {
        Self::from_degrees(self.degrees * factor)
    }
}

impl Div<f64> for Angle {
    type Output = Self;

    fn div(self, divisor: f64) -> Self::Output {
        assert!(divisor != 0.0, "angle divided by zero");
        Self::from_degrees(self.degrees / divisor)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{00b0}", self.degrees)
    }
}
