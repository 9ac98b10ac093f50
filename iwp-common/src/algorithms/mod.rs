/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
// private sub-module defined in other files
mod is_clockwise_order;
mod line_length;
mod poly_ops;

// exports identifiers from private sub-modules in the current module namespace
pub use self::is_clockwise_order::is_clockwise_order;
pub use self::line_length::polyline_length;
pub use self::poly_ops::{point_in_poly, winding_number};
