pub mod host;
pub mod surface;

pub use host::*;
pub use surface::*;
