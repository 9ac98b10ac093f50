// private sub-module defined in other files
mod raster_to_vector_lines;
mod vector_polygons_to_raster;

// exports identifiers from private sub-modules in the current module namespace
pub use self::raster_to_vector_lines::{lines_to_shapefile, trace_lines, RasterToVectorLines};
pub use self::vector_polygons_to_raster::{rasterize_polygons, VectorPolygonsToRaster};
