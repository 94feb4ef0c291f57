//! MGRS/UTM coordinate conversion and level-of-detail grid selection.

pub mod clip;
pub mod config;
pub mod element;
pub mod error;
pub mod extent;
pub mod graticule;
pub mod grid_zone;
pub mod labels;
pub mod layer;
pub mod mgrs;
pub mod square;
pub mod tm;
pub mod utm;
pub mod zone;

pub use clip::*;
pub use config::*;
pub use element::*;
pub use error::*;
pub use extent::*;
pub use graticule::*;
pub use grid_zone::*;
pub use labels::*;
pub use layer::*;
pub use mgrs::*;
pub use square::*;
pub use tm::*;
pub use utm::*;
pub use zone::*;
