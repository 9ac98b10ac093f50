// private sub-module defined in other files
mod polygon_annulus_buffer;

pub mod geometry_conversion;

// exports identifiers from private sub-modules in the current module namespace
pub use self::polygon_annulus_buffer::{annulus_buffer, buffer_features, buffer_layer};
pub use self::polygon_annulus_buffer::PolygonAnnulusBuffer;
