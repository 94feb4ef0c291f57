pub mod draw_context;
pub mod frustum;
pub mod orbit;
pub mod view;

pub use draw_context::*;
pub use frustum::*;
pub use orbit::*;
pub use view::*;
