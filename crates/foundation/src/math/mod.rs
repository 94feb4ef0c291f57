pub mod geodesy;
pub mod geometry;
pub mod vec;

pub use geodesy::*;
pub use geometry::*;
pub use vec::*;
