//! Geometry primitives for the `kaart` map widget core.
//!
//! This crate contains the small set of cartesian types the route engine
//! needs: coordinates, straight segments with nearest-point projection, and
//! an open [`LineString`] used for resolved route geometries.

mod line_string;
mod point;
mod segment;

pub use line_string::LineString;
pub use point::Coordinate;
pub use segment::Segment;
