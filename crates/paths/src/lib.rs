pub mod culling;
pub mod path;
pub mod subdivision;

pub use culling::*;
pub use path::*;
pub use subdivision::*;

pub use foundation::math::PathType;
