use nalgebra::Point2;

/// 2d cartesian coordinate in the map's projected CRS.
pub type Coordinate = Point2<f64>;
