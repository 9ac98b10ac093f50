// private sub-module defined in other files
mod line_thin;

// exports identifiers from private sub-modules in the current module namespace
pub use self::line_thin::{thin, LineThinning};
