use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Tunables for grid selection. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Above this eye altitude only the UTM graticule is drawn.
    pub zone_max_altitude: f64,
    /// At or below this eye altitude the 100 km squares are drawn.
    pub square_max_altitude: f64,
    /// Smallest on-screen size of a square worth drawing.
    pub min_cell_size_px: f64,
    /// Distance of zone and scale labels from the view centre.
    pub label_offset_px: f64,
    pub label_min_latitude: f64,
    pub label_max_latitude: f64,
    /// Pixel spacing of terrain-following samples on grid lines.
    pub terrain_conformance: f64,
    /// Eye movement, as a fraction of altitude, that forces a new selection.
    pub eye_move_fraction: f64,
    /// Heading, pitch or field-of-view change in degrees that forces a new
    /// selection.
    pub view_angle_threshold: f64,
    pub show_labels: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            zone_max_altitude: 5_000_000.0,
            square_max_altitude: 3_000_000.0,
            min_cell_size_px: 50.0,
            label_offset_px: 50.0,
            label_min_latitude: -76.0,
            label_max_latitude: 78.0,
            terrain_conformance: 10.0,
            eye_move_fraction: 0.01,
            view_angle_threshold: 1.0,
            show_labels: true,
        }
    }
}

impl GridConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), "grid config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("zone_max_altitude", self.zone_max_altitude),
            ("square_max_altitude", self.square_max_altitude),
            ("min_cell_size_px", self.min_cell_size_px),
            ("terrain_conformance", self.terrain_conformance),
            ("view_angle_threshold", self.view_angle_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.eye_move_fraction.is_finite() && self.eye_move_fraction >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "eye_move_fraction must be non-negative, got {}",
                self.eye_move_fraction
            )));
        }
        if !self.label_offset_px.is_finite() {
            return Err(ConfigError::Invalid("label_offset_px must be finite".to_string()));
        }
        if self.square_max_altitude > self.zone_max_altitude {
            return Err(ConfigError::Invalid(format!(
                "square_max_altitude {} exceeds zone_max_altitude {}",
                self.square_max_altitude, self.zone_max_altitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.label_min_latitude)
            || !(-90.0..=90.0).contains(&self.label_max_latitude)
            || self.label_min_latitude > self.label_max_latitude
        {
            return Err(ConfigError::Invalid(format!(
                "label latitude range {}..{} is not a valid latitude range",
                self.label_min_latitude, self.label_max_latitude
            )));
        }
        Ok(())
    }

    /// Square size in pixels above which its grid is considered.
    pub fn grid_consider_px(&self) -> f64 {
        self.min_cell_size_px * 2.0
    }

    /// Grid size in pixels above which its lines are drawn.
    pub fn grid_visible_px(&self) -> f64 {
        self.min_cell_size_px * 4.0
    }

    pub fn scale_label_px(&self) -> f64 {
        self.min_cell_size_px * 4.0 * 1.7
    }

    /// Grid size in pixels above which the next finer grids are built.
    pub fn subgrid_px(&self) -> f64 {
        self.min_cell_size_px * 4.0 * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::GridConfig;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_and_thresholds() {
        let c = GridConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.grid_consider_px(), 100.0);
        assert_eq!(c.grid_visible_px(), 200.0);
        assert_eq!(c.scale_label_px(), 340.0);
        assert_eq!(c.subgrid_px(), 400.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = GridConfig::from_json_str(r#"{ "min_cell_size_px": 64.0, "show_labels": false }"#).unwrap();
        assert_eq!(
            c,
            GridConfig {
                min_cell_size_px: 64.0,
                show_labels: false,
                ..GridConfig::default()
            }
        );
    }

    #[test]
    fn rejects_unknown_and_invalid_values() {
        assert!(matches!(
            GridConfig::from_json_str(r#"{ "zone_max": 1.0 }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            GridConfig::from_json_str(r#"{ "min_cell_size_px": 0.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GridConfig::from_json_str(r#"{ "square_max_altitude": 6000000.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "zone_max_altitude": 4000000.0, "square_max_altitude": 2000000.0 }}"#).unwrap();
        let c = GridConfig::load(file.path()).unwrap();
        assert_eq!(c.zone_max_altitude, 4_000_000.0);
        assert_eq!(c.square_max_altitude, 2_000_000.0);
        assert_eq!(c.label_max_latitude, 78.0);

        let missing = file.path().with_extension("missing");
        assert!(matches!(GridConfig::load(&missing), Err(ConfigError::Io { .. })));
    }
}
