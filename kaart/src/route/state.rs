//! The route graph state and its incremental update rules.

use super::proto::{ProtoRoute, Versions};
use super::waypoint::{Waypoint, WaypointId, WaypointOperation};

/// State of the drawn route: the ordered waypoint sequence plus version bookkeeping for every
/// route segment that ever existed between two waypoints.
///
/// All mutation goes through [`RouteState::apply`], which processes operations strictly in
/// arrival order and computes the minimal add/remove delta for each.
#[derive(Debug, Clone, Default)]
pub struct RouteState {
    waypoints: Vec<Waypoint>,
    versions: Versions,
}

/// Net effect of one waypoint operation on the set of route segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteChanges {
    /// Segments that must be resolved and displayed.
    pub routes_added: Vec<ProtoRoute>,
    /// Segments that must disappear. Removal never needs a routing service.
    pub routes_removed: Vec<ProtoRoute>,
}

impl RouteState {
    /// Creates an empty route state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The waypoints in path order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// The recorded segment versions.
    pub fn versions(&self) -> &Versions {
        &self.versions
    }

    /// Applies one operation and returns the segment delta it causes.
    pub fn apply(&mut self, operation: &WaypointOperation) -> RouteChanges {
        match operation {
            WaypointOperation::Add { waypoint, previous } => {
                self.add_waypoint(*waypoint, *previous)
            }
            WaypointOperation::Remove { waypoint } => self.remove_waypoint(waypoint.id),
        }
    }

    fn add_waypoint(&mut self, waypoint: Waypoint, previous: Option<WaypointId>) -> RouteChanges {
        let Some(previous) = previous else {
            // Insert at the head. The only new segment connects the new waypoint to the old
            // head, if there was one.
            let routes_added: Vec<_> = self
                .waypoints
                .first()
                .map(|old_head| ProtoRoute::between(waypoint, *old_head, &self.versions))
                .into_iter()
                .collect();

            self.waypoints.insert(0, waypoint);
            self.record(&routes_added);

            return RouteChanges {
                routes_added,
                routes_removed: Vec::new(),
            };
        };

        let Some(index) = self.position(previous) else {
            log::warn!("ignoring insertion after unknown waypoint {previous}");
            return RouteChanges::default();
        };

        let previous = self.waypoints[index];
        let old_next = self.waypoints.get(index + 1).copied();

        // All versions are derived from the snapshot before this operation; the touched ids
        // within one operation are distinct as long as waypoint ids are unique.
        let routes_removed: Vec<_> = old_next
            .map(|next| ProtoRoute::between(previous, next, &self.versions))
            .into_iter()
            .collect();
        let mut routes_added = vec![ProtoRoute::between(previous, waypoint, &self.versions)];
        if let Some(next) = old_next {
            routes_added.push(ProtoRoute::between(waypoint, next, &self.versions));
        }

        self.waypoints.insert(index + 1, waypoint);
        self.record(&routes_removed);
        self.record(&routes_added);

        RouteChanges {
            routes_added,
            routes_removed,
        }
    }

    fn remove_waypoint(&mut self, id: WaypointId) -> RouteChanges {
        let Some(index) = self.position(id) else {
            // Removing an unknown waypoint leaves the state untouched.
            return RouteChanges::default();
        };

        let removed = self.waypoints[index];
        let previous = index
            .checked_sub(1)
            .and_then(|i| self.waypoints.get(i))
            .copied();
        let next = self.waypoints.get(index + 1).copied();

        let mut routes_removed = Vec::new();
        if let Some(next) = next {
            routes_removed.push(ProtoRoute::between(removed, next, &self.versions));
        }
        if let Some(previous) = previous {
            routes_removed.push(ProtoRoute::between(previous, removed, &self.versions));
        }

        // When the removed waypoint had neighbours on both sides, a single segment bridges the
        // gap.
        let routes_added: Vec<_> = previous
            .zip(next)
            .map(|(previous, next)| ProtoRoute::between(previous, next, &self.versions))
            .into_iter()
            .collect();

        self.waypoints.remove(index);
        self.record(&routes_removed);
        self.record(&routes_added);

        RouteChanges {
            routes_added,
            routes_removed,
        }
    }

    fn position(&self, id: WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|waypoint| waypoint.id == id)
    }

    fn record(&mut self, routes: &[ProtoRoute]) {
        for route in routes {
            self.versions.insert(route.id.clone(), route.version);
        }
    }
}

#[cfg(test)]
mod tests {
    use kaart_types::Coordinate;

    use super::super::proto::RouteId;
    use super::*;

    fn waypoint(id: u64) -> Waypoint {
        Waypoint::new(id, Coordinate::new(id as f64, 0.0))
    }

    fn add(state: &mut RouteState, id: u64, previous: Option<u64>) -> RouteChanges {
        state.apply(&WaypointOperation::Add {
            waypoint: waypoint(id),
            previous: previous.map(WaypointId),
        })
    }

    fn remove(state: &mut RouteState, id: u64) -> RouteChanges {
        state.apply(&WaypointOperation::Remove {
            waypoint: waypoint(id),
        })
    }

    fn ids(waypoints: &[Waypoint]) -> Vec<u64> {
        waypoints.iter().map(|wp| wp.id.0).collect()
    }

    fn route(changes: &[ProtoRoute], index: usize) -> (&str, u64) {
        (changes[index].id.as_str(), changes[index].version)
    }

    #[test]
    fn linear_insertion() {
        let mut state = RouteState::new();

        let changes = add(&mut state, 1, None);
        assert_eq!(changes, RouteChanges::default());

        let changes = add(&mut state, 2, Some(1));
        assert_eq!(changes.routes_removed, Vec::new());
        assert_eq!(changes.routes_added.len(), 1);
        assert_eq!(route(&changes.routes_added, 0), ("1_2", 0));
        assert_eq!(ids(state.waypoints()), [1, 2]);
    }

    #[test]
    fn insertion_at_head_connects_to_the_old_head() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);

        let changes = add(&mut state, 2, None);
        assert_eq!(changes.routes_removed, Vec::new());
        assert_eq!(route(&changes.routes_added, 0), ("2_1", 0));
        assert_eq!(ids(state.waypoints()), [2, 1]);
    }

    #[test]
    fn insertion_in_the_middle_splits_the_segment() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);
        add(&mut state, 2, Some(1));

        let changes = add(&mut state, 3, Some(1));
        assert_eq!(changes.routes_removed.len(), 1);
        // The split segment is retired with a bumped version so that a slow resolution of the
        // original segment can never override the split.
        assert_eq!(route(&changes.routes_removed, 0), ("1_2", 1));
        assert_eq!(changes.routes_added.len(), 2);
        assert_eq!(route(&changes.routes_added, 0), ("1_3", 0));
        assert_eq!(route(&changes.routes_added, 1), ("3_2", 0));
        assert_eq!(ids(state.waypoints()), [1, 3, 2]);
    }

    #[test]
    fn insertion_after_unknown_waypoint_is_ignored() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);

        let changes = add(&mut state, 2, Some(99));
        assert_eq!(changes, RouteChanges::default());
        assert_eq!(ids(state.waypoints()), [1]);
    }

    #[test]
    fn removing_an_inner_waypoint_bridges_its_neighbours() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);
        add(&mut state, 2, Some(1));
        add(&mut state, 3, Some(2));

        let changes = remove(&mut state, 2);
        assert_eq!(changes.routes_removed.len(), 2);
        assert_eq!(route(&changes.routes_removed, 0), ("2_3", 1));
        assert_eq!(route(&changes.routes_removed, 1), ("1_2", 1));
        assert_eq!(changes.routes_added.len(), 1);
        assert_eq!(route(&changes.routes_added, 0), ("1_3", 0));
        assert_eq!(ids(state.waypoints()), [1, 3]);
    }

    #[test]
    fn removing_an_end_waypoint_removes_one_segment() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);
        add(&mut state, 2, Some(1));

        let changes = remove(&mut state, 2);
        assert_eq!(changes.routes_added, Vec::new());
        assert_eq!(changes.routes_removed.len(), 1);
        assert_eq!(route(&changes.routes_removed, 0), ("1_2", 1));
        assert_eq!(ids(state.waypoints()), [1]);
    }

    #[test]
    fn removal_of_unknown_waypoint_is_idempotent() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);
        add(&mut state, 2, Some(1));
        let versions_before = state.versions().clone();

        let changes = remove(&mut state, 99);
        assert_eq!(changes, RouteChanges::default());
        assert_eq!(ids(state.waypoints()), [1, 2]);
        assert_eq!(state.versions(), &versions_before);
    }

    #[test]
    fn recreated_segment_gets_a_fresh_higher_version() {
        let mut state = RouteState::new();
        add(&mut state, 1, None);
        add(&mut state, 2, Some(1)); // 1_2 @ 0
        remove(&mut state, 2); // 1_2 retired @ 1

        let changes = add(&mut state, 2, Some(1));
        assert_eq!(route(&changes.routes_added, 0), ("1_2", 2));

        let recorded = state
            .versions()
            .get(&RouteId::between(WaypointId(1), WaypointId(2)))
            .copied();
        assert_eq!(recorded, Some(2));
    }
}
