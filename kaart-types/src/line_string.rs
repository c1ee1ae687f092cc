use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::point::Coordinate;
use crate::segment::Segment;

/// An open sequence of points connected by straight segments.
///
/// Route geometries returned by routing services are represented by this type. In contrast to
/// closed contours, the first and the last points are never considered connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    points: Vec<Coordinate>,
}

impl LineString {
    /// Creates a new line string from the given points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Points of the line string.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Iterates over the segments of the line string.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.points.windows(2).map(|pair| Segment(&pair[0], &pair[1]))
    }

    /// Point of the line string closest to `point`.
    ///
    /// Returns `None` if the line string contains no points.
    pub fn closest_point(&self, point: &Coordinate) -> Option<Coordinate> {
        if self.points.len() < 2 {
            return self.points.first().copied();
        }

        self.iter_segments()
            .map(|segment| segment.nearest_point(point))
            .min_by(|a, b| {
                (point - a)
                    .norm_squared()
                    .partial_cmp(&(point - b).norm_squared())
                    .unwrap_or(Ordering::Equal)
            })
    }

    /// Total length of the line string.
    pub fn length(&self) -> f64 {
        self.iter_segments().map(|segment| segment.length()).sum()
    }
}
