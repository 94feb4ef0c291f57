use core::fmt;

use foundation::{Angle, Sector};

use crate::error::GlobeError;

/// Terrain height source, in meters above the ellipsoid.
///
/// Implementations return `0.0` wherever they have no data.
pub trait ElevationModel: fmt::Debug + Send + Sync {
    fn elevation(&self, lat: Angle, lon: Angle) -> f64;

    /// Conservative `(min, max)` elevation over `sector`.
    fn min_and_max_elevations(&self, sector: &Sector) -> (f64, f64);

    /// `(min, max)` elevation over the whole model.
    fn extreme_elevations(&self) -> (f64, f64);
}

/// Flat terrain at the ellipsoid surface.
#[derive(Debug, Copy, Clone, Default)]
pub struct ZeroElevationModel;

impl ElevationModel for ZeroElevationModel {
    fn elevation(&self, _lat: Angle, _lon: Angle) -> f64 {
        0.0
    }

    fn min_and_max_elevations(&self, _sector: &Sector) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn extreme_elevations(&self) -> (f64, f64) {
        (0.0, 0.0)
    }
}

/// Uniform height everywhere; handy for lifted reference surfaces.
#[derive(Debug, Copy, Clone)]
pub struct ConstantElevationModel(pub f64);

impl ElevationModel for ConstantElevationModel {
    fn elevation(&self, _lat: Angle, _lon: Angle) -> f64 {
        self.0
    }

    fn min_and_max_elevations(&self, _sector: &Sector) -> (f64, f64) {
        (self.0, self.0)
    }

    fn extreme_elevations(&self) -> (f64, f64) {
        (self.0, self.0)
    }
}

/// A regular grid of height samples covering one sector.
///
/// Row 0 lies on the southern edge and column 0 on the western edge.
/// Samples that are not finite count as missing and read back as `0.0`,
/// as does everything outside the covered sector.
#[derive(Debug, Clone)]
pub struct RasterElevationModel {
    sector: Sector,
    width: usize,
    height: usize,
    samples: Vec<f64>,
}

impl RasterElevationModel {
    pub fn new(
        sector: Sector,
        width: usize,
        height: usize,
        samples: Vec<f64>,
    ) -> Result<Self, GlobeError> {
        if width < 2 || height < 2 {
            return Err(GlobeError::RasterTooSmall { width, height });
        }
        let expected = width * height;
        if samples.len() != expected {
            return Err(GlobeError::RasterSize {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            sector,
            width,
            height,
            samples,
        })
    }

    pub fn sector(&self) -> &Sector {
        &self.sector
    }

    fn sample(&self, row: usize, col: usize) -> f64 {
        let v = self.samples[row * self.width + col];
        if v.is_finite() { v } else { 0.0 }
    }

    /// Fractional (row, col) of a location inside the covered sector.
    fn grid_coords(&self, lat: f64, lon: f64) -> (f64, f64) {
        let s = &self.sector;
        let dlat = s.delta_lat().degrees();
        let dlon = s.delta_lon().degrees();
        let fy = if dlat > 0.0 {
            (lat - s.min_latitude().degrees()) / dlat
        } else {
            0.0
        };
        let fx = if dlon > 0.0 {
            (lon - s.min_longitude().degrees()) / dlon
        } else {
            0.0
        };
        (
            fy * (self.height - 1) as f64,
            fx * (self.width - 1) as f64,
        )
    }
}

impl ElevationModel for RasterElevationModel {
    fn elevation(&self, lat: Angle, lon: Angle) -> f64 {
        if !self.sector.contains_degrees(lat.degrees(), lon.degrees()) {
            return 0.0;
        }
        let (y, x) = self.grid_coords(lat.degrees(), lon.degrees());
        let r0 = (y.floor() as usize).min(self.height - 2);
        let c0 = (x.floor() as usize).min(self.width - 2);
        let ty = (y - r0 as f64).clamp(0.0, 1.0);
        let tx = (x - c0 as f64).clamp(0.0, 1.0);

        let h00 = self.sample(r0, c0);
        let h01 = self.sample(r0, c0 + 1);
        let h10 = self.sample(r0 + 1, c0);
        let h11 = self.sample(r0 + 1, c0 + 1);
        let south = h00 + (h01 - h00) * tx;
        let north = h10 + (h11 - h10) * tx;
        south + (north - south) * ty
    }

    fn min_and_max_elevations(&self, sector: &Sector) -> (f64, f64) {
        let Some(overlap) = self.sector.intersection(sector) else {
            return (0.0, 0.0);
        };
        let (y0, x0) = self.grid_coords(
            overlap.min_latitude().degrees(),
            overlap.min_longitude().degrees(),
        );
        let (y1, x1) = self.grid_coords(
            overlap.max_latitude().degrees(),
            overlap.max_longitude().degrees(),
        );
        let r0 = y0.floor().max(0.0) as usize;
        let r1 = (y1.ceil() as usize).min(self.height - 1);
        let c0 = x0.floor().max(0.0) as usize;
        let c1 = (x1.ceil() as usize).min(self.width - 1);

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for row in r0..=r1 {
            for col in c0..=c1 {
                let v = self.sample(row, col);
                min = min.min(v);
                max = max.max(v);
            }
        }
        // Parts of `sector` beyond the raster read as zero.
        if overlap != *sector {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        (min, max)
    }

    fn extreme_elevations(&self) -> (f64, f64) {
        let mut min = 0.0_f64;
        let mut max = 0.0_f64;
        for row in 0..self.height {
            for col in 0..self.width {
                let v = self.sample(row, col);
                min = min.min(v);
                max = max.max(v);
            }
        }
        (min, max)
    }
}
