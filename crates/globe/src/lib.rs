pub mod elevation;
pub mod error;
pub mod globe;
pub mod local;
pub mod projection;

pub use elevation::*;
pub use error::*;
pub use globe::*;
pub use local::*;
pub use projection::*;
