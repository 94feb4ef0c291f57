use std::path::PathBuf;

use thiserror::Error;

/// Coordinates outside the UTM/MGRS domain or malformed references.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("latitude {0}° is outside the UTM domain (-80..84)")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0}° is outside -180..180")]
    LongitudeOutOfRange(f64),
    #[error("UTM zone {0} is outside 1..60")]
    InvalidZone(i64),
    #[error("easting {0} m is outside 100000..900000")]
    EastingOutOfRange(f64),
    #[error("northing {0} m is outside 0..10000000")]
    NorthingOutOfRange(f64),
    #[error("MGRS precision {0} is outside 0..=5")]
    InvalidPrecision(u8),
    #[error("invalid MGRS reference `{input}`: {reason}")]
    InvalidMgrs { input: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed grid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid grid config: {0}")]
    Invalid(String),
}
