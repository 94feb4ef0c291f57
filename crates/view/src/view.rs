use foundation::math::Vec3;
use foundation::{Angle, Position, Sector};
use globe::Globe;

use crate::frustum::Frustum;

/// Screen dimensions in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "viewport must be non-empty");
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

/// What the grid and path code needs to know about the camera.
pub trait View {
    fn eye_point(&self) -> Vec3;

    fn eye_position(&self) -> Position;

    /// Horizontal field of view.
    fn field_of_view(&self) -> Angle;

    /// `None` for views without an orbit-style heading.
    fn heading(&self) -> Option<Angle>;

    fn pitch(&self) -> Option<Angle>;

    fn viewport(&self) -> Viewport;

    fn frustum(&self) -> &Frustum;

    /// Point on the surface the view looks at, if any.
    fn center_position(&self) -> Option<Position>;

    /// Geographic regions that may be on screen. Never wraps the antimeridian.
    fn visible_sectors(&self, globe: &Globe) -> Vec<Sector>;

    /// Size in meters of one pixel at `distance` meters from the eye.
    fn compute_pixel_size_at_distance(&self, distance: f64) -> f64 {
        let width = self.viewport().width as f64;
        2.0 * distance.abs() * self.field_of_view().tan_half_angle() / width
    }
}
