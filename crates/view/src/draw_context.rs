use foundation::math::Vec3;
use foundation::{Angle, LatLon, Sector};
use globe::Globe;
use runtime::Frame;

use crate::view::View;

/// Per-frame inputs shared by everything that selects or tessellates geometry.
pub struct DrawContext<'a> {
    pub globe: &'a Globe,
    pub view: &'a dyn View,
    pub vertical_exaggeration: f64,
    pub frame: Frame,
    pub visible_sectors: Vec<Sector>,
}

impl<'a> DrawContext<'a> {
    pub fn new(globe: &'a Globe, view: &'a dyn View, vertical_exaggeration: f64, frame: Frame) -> Self {
        assert!(
            vertical_exaggeration.is_finite(),
            "vertical exaggeration must be finite"
        );
        let visible_sectors = view.visible_sectors(globe);
        Self {
            globe,
            view,
            vertical_exaggeration,
            frame,
            visible_sectors,
        }
    }

    /// Terrain point at a location, exaggerated.
    pub fn surface_point(&self, lat: Angle, lon: Angle) -> Vec3 {
        self.globe.surface_point(lat, lon, self.vertical_exaggeration)
    }

    pub fn surface_point_at(&self, location: LatLon) -> Vec3 {
        self.surface_point(location.latitude, location.longitude)
    }

    /// Eye height above the terrain directly below it.
    pub fn eye_altitude_above_ground(&self) -> f64 {
        let eye = self.view.eye_position();
        eye.elevation - self.globe.elevation(eye.latitude, eye.longitude) * self.vertical_exaggeration
    }

    /// Size in meters of one pixel at a model point.
    pub fn pixel_size_at(&self, point: Vec3) -> f64 {
        self.view
            .compute_pixel_size_at_distance(self.view.eye_point().distance_to(point))
    }

    pub fn is_sector_visible(&self, sector: &Sector) -> bool {
        self.visible_sectors.iter().any(|s| s.intersects(sector))
    }
}
