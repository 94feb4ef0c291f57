use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GlobeError {
    #[error("unknown projection `{0}`")]
    UnknownProjection(String),
    #[error("raster of {width}x{height} needs {expected} samples, got {actual}")]
    RasterSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("raster must be at least 2x2 samples, got {width}x{height}")]
    RasterTooSmall { width: usize, height: usize },
}
