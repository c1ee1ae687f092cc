//! Route segments and the events the engine emits about them.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use kaart_types::LineString;
use serde::{Deserialize, Serialize};

use super::waypoint::{Waypoint, WaypointId};

/// Identifier of a route segment, derived deterministically from the ids of its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(String);

impl RouteId {
    /// The id of the segment from `begin` to `end`.
    pub fn between(begin: WaypointId, end: WaypointId) -> Self {
        Self(format!("{begin}_{end}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RouteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version bookkeeping for route segments.
///
/// Keys are never evicted: the map is scoped to one drawing session and bounded by the number of
/// user edits.
pub type Versions = HashMap<RouteId, u64, ahash::RandomState>;

/// A request to compute a geometry between two adjacent waypoints; not yet resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtoRoute {
    /// Identifier of the segment.
    pub id: RouteId,
    /// Version of the segment. Strictly increases every time the same begin/end pair is touched,
    /// so consumers can discard stale, out-of-order resolution results.
    pub version: u64,
    /// Begin waypoint of the segment.
    pub begin: Waypoint,
    /// End waypoint of the segment.
    pub end: Waypoint,
}

impl ProtoRoute {
    /// Creates a proto route between two waypoints, deriving its version from the recorded
    /// versions: one more than the recorded version for this id, or 0 for an id that was never
    /// seen.
    pub fn between(begin: Waypoint, end: Waypoint, versions: &Versions) -> Self {
        let id = RouteId::between(begin.id, end.id);
        let version = versions.get(&id).map(|version| version + 1).unwrap_or(0);
        Self {
            id,
            version,
            begin,
            end,
        }
    }
}

/// A resolved route segment: a proto route plus the geometry a routing service computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRoute {
    /// The request this geometry resolves.
    pub proto: ProtoRoute,
    /// The computed geometry.
    pub geometry: LineString,
    /// Opaque routing service metadata about the traversed network edges.
    pub edges: Option<serde_json::Value>,
}

/// An incremental update of the drawn route, emitted once per net change per waypoint operation.
///
/// The consumer (the rendering layer) owns the display of the carried geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RouteEvent {
    /// A resolved route segment was added.
    Added {
        /// Identifier of the segment.
        id: RouteId,
        /// Version of the segment.
        version: u64,
        /// Id of the segment's begin waypoint. Lets the consumer order partial routes, e.g. to
        /// measure the drawn length so far.
        start_waypoint_id: WaypointId,
        /// The resolved geometry.
        geometry: LineString,
        /// The begin waypoint moved onto the resolved geometry, if the geometry does not pass
        /// through its location exactly.
        begin_snap: Option<Waypoint>,
        /// The end waypoint moved onto the resolved geometry, if the geometry does not pass
        /// through its location exactly.
        end_snap: Option<Waypoint>,
        /// Opaque routing service metadata.
        edges: Option<serde_json::Value>,
    },
    /// A route segment was removed.
    Removed {
        /// Identifier of the segment.
        id: RouteId,
        /// Version of the segment.
        version: u64,
        /// Id of the segment's begin waypoint.
        start_waypoint_id: WaypointId,
    },
}

impl RouteEvent {
    /// Identifier of the route segment the event is about.
    pub fn id(&self) -> &RouteId {
        match self {
            RouteEvent::Added { id, .. } | RouteEvent::Removed { id, .. } => id,
        }
    }

    /// Version of the route segment the event is about.
    pub fn version(&self) -> u64 {
        match self {
            RouteEvent::Added { version, .. } | RouteEvent::Removed { version, .. } => *version,
        }
    }

    pub(super) fn added(
        route: GeometryRoute,
        begin_snap: Option<Waypoint>,
        end_snap: Option<Waypoint>,
    ) -> Self {
        RouteEvent::Added {
            id: route.proto.id,
            version: route.proto.version,
            start_waypoint_id: route.proto.begin.id,
            geometry: route.geometry,
            begin_snap,
            end_snap,
            edges: route.edges,
        }
    }

    pub(super) fn removed(proto: &ProtoRoute) -> Self {
        RouteEvent::Removed {
            id: proto.id.clone(),
            version: proto.version,
            start_waypoint_id: proto.begin.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use kaart_types::Coordinate;

    use super::*;

    fn waypoint(id: u64) -> Waypoint {
        Waypoint::new(id, Coordinate::new(id as f64, 0.0))
    }

    #[test]
    fn route_id_is_derived_from_endpoints() {
        assert_eq!(
            RouteId::between(WaypointId(1), WaypointId(2)).as_str(),
            "1_2"
        );
    }

    #[test]
    fn version_starts_at_zero_for_new_ids() {
        let versions = Versions::default();
        let proto = ProtoRoute::between(waypoint(1), waypoint(2), &versions);
        assert_eq!(proto.version, 0);
    }

    #[test]
    fn version_increments_over_the_recorded_one() {
        let mut versions = Versions::default();
        versions.insert(RouteId::between(WaypointId(1), WaypointId(2)), 4);

        let proto = ProtoRoute::between(waypoint(1), waypoint(2), &versions);
        assert_eq!(proto.version, 5);

        // The reverse direction is a different route id.
        let reverse = ProtoRoute::between(waypoint(2), waypoint(1), &versions);
        assert_eq!(reverse.version, 0);
    }
}
