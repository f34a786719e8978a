//! Height fields for terrain LOD: the [`HeightField`] query capability, a dense
//! grid implementation, fault-formation generation, and grayscale image I/O.

mod error;
mod field;
mod image_io;

pub mod fault;

pub use error::HeightFieldError;
pub use fault::FaultParams;
pub use field::{DEFAULT_HEIGHT, HeightField, HeightGrid};
