pub mod angle;
pub mod latlon;
pub mod math;
pub mod sector;

// Foundation crate: small, well-tested primitives only.
pub use angle::*;
pub use latlon::*;
pub use sector::*;
