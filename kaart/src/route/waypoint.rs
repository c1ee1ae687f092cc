//! Waypoints and the operations a drawing tool feeds into the route engine.

use std::fmt::{Display, Formatter};

use kaart_types::Coordinate;
use serde::{Deserialize, Serialize};

/// Identifier of a waypoint.
///
/// Ids must be unique within one drawing session. The engine locates neighbours by the first
/// waypoint matching an id, so feeding it duplicate ids is a precondition violation with
/// unspecified results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WaypointId(pub u64);

impl Display for WaypointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for WaypointId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A user-placed point on a drawn route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Stable identity of the waypoint. A waypoint keeps its id when its location is snapped to
    /// the resolved route geometry.
    pub id: WaypointId,
    /// Location of the waypoint in the map's projected CRS.
    pub location: Coordinate,
}

impl Waypoint {
    /// Creates a new waypoint.
    pub fn new(id: impl Into<WaypointId>, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

/// An edit of the drawn route.
///
/// Moving a waypoint is expressed as a [`WaypointOperation::Remove`] followed by a
/// [`WaypointOperation::Add`] with the same id; this bumps the versions of the adjacent routes so
/// that stale resolutions of the old location are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaypointOperation {
    /// Adds a waypoint to the route.
    Add {
        /// The added waypoint.
        waypoint: Waypoint,
        /// The waypoint to insert after, or `None` to insert at the head of the route.
        previous: Option<WaypointId>,
    },
    /// Removes a waypoint from the route. Removing an unknown waypoint is a no-op.
    Remove {
        /// The removed waypoint.
        waypoint: Waypoint,
    },
}
