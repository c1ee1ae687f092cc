use crate::point::Coordinate;

/// A straight line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a>(pub &'a Coordinate, pub &'a Coordinate);

impl Segment<'_> {
    /// Point of the segment closest to `point`:
    ///
    /// * if the normal from the point to the segment ends inside the segment, the foot of the
    ///   normal is returned
    /// * if the normal ends outside of the segment, the nearer of the segment's endpoints is
    ///   returned
    pub fn nearest_point(&self, point: &Coordinate) -> Coordinate {
        if self.0 == self.1 {
            return *self.0;
        }

        let ds = self.1 - self.0;
        let dp = point - self.0;
        let ds_len = ds.x * ds.x + ds.y * ds.y;

        let r = (dp.x * ds.x + dp.y * ds.y) / ds_len;
        if r <= 0.0 {
            *self.0
        } else if r >= 1.0 {
            *self.1
        } else {
            *self.0 + ds * r
        }
    }

    /// Shortest euclidian distance (squared) between a point and the segment.
    pub fn distance_to_point_sq(&self, point: &Coordinate) -> f64 {
        (point - self.nearest_point(point)).norm_squared()
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        (self.1 - self.0).norm()
    }
}
