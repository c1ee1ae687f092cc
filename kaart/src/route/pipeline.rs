//! The channel pipeline turning waypoint operations into route events.
//!
//! Two background tasks implement the engine:
//!
//! * the *reducer* task folds incoming operations into the [`RouteState`], emits removed-events
//!   synchronously and spawns one resolution task per added segment;
//! * the *filter* task owns the map of last emitted versions and drops events that have been
//!   superseded by a later edit.
//!
//! Route resolutions are never cancelled when a segment is edited away while they are in flight;
//! their late results are discarded by the filter instead.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::proto::{GeometryRoute, RouteEvent, Versions};
use super::service::{CompositeRouting, RoutingService, StraightLineRouting};
use super::state::RouteState;
use super::waypoint::{Waypoint, WaypointOperation};

const CHANNEL_CAPACITY: usize = 64;

/// Runs the route engine over a stream of waypoint operations, resolving segment geometries with
/// the given routing service.
///
/// The returned receiver yields the engine's route events; it closes when the operation sender is
/// dropped and all in-flight resolutions have finished. Must be called within a tokio runtime.
pub fn route_events(
    mut operations: mpsc::Receiver<WaypointOperation>,
    service: Arc<dyn RoutingService>,
) -> mpsc::Receiver<RouteEvent> {
    let (raw_tx, raw_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (filtered_tx, filtered_rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut state = RouteState::new();
        while let Some(operation) = operations.recv().await {
            let changes = state.apply(&operation);

            // Removals don't need the routing service and are emitted right away, before any
            // resolution of this operation's added segments can complete.
            for removed in &changes.routes_removed {
                if raw_tx.send(RouteEvent::removed(removed)).await.is_err() {
                    return;
                }
            }

            for added in changes.routes_added {
                let service = Arc::clone(&service);
                let events = raw_tx.clone();
                tokio::spawn(async move {
                    match service.resolve(&added).await {
                        Ok(route) => {
                            let _ = events.send(added_event(route)).await;
                        }
                        Err(error) => {
                            log::warn!("failed to resolve route {}: {error}", added.id)
                        }
                    }
                });
            }
        }
    });

    tokio::spawn(async move {
        let mut raw_rx = raw_rx;
        let mut versions = Versions::default();
        while let Some(event) = raw_rx.recv().await {
            if let Some(event) = filter_stale(&mut versions, event) {
                if filtered_tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    });

    filtered_rx
}

/// Route engine resolving every segment as a straight line.
pub fn direct_routes(
    operations: mpsc::Receiver<WaypointOperation>,
) -> mpsc::Receiver<RouteEvent> {
    route_events(operations, Arc::new(StraightLineRouting))
}

/// Route engine resolving segments with the given service, falling back to straight lines when
/// it fails.
pub fn custom_routes(
    operations: mpsc::Receiver<WaypointOperation>,
    service: Box<dyn RoutingService>,
) -> mpsc::Receiver<RouteEvent> {
    route_events(operations, Arc::new(CompositeRouting::with_refined(service)))
}

/// Passes the event through unless a later version of the same route has already been emitted,
/// and records the version of every passed event.
///
/// Resolutions complete in arbitrary order, so an event may arrive after the segment it belongs
/// to was already replaced. Dropping by version guarantees a consumer never regresses to a stale
/// geometry.
fn filter_stale(versions: &mut Versions, event: RouteEvent) -> Option<RouteEvent> {
    match versions.get(event.id()).copied() {
        Some(last) if event.version() < last => {
            log::debug!(
                "dropping stale event for route {} (version {} < {last})",
                event.id(),
                event.version()
            );
            None
        }
        _ => {
            versions.insert(event.id().clone(), event.version());
            Some(event)
        }
    }
}

fn added_event(route: GeometryRoute) -> RouteEvent {
    let begin_snap = snap(&route, &route.proto.begin);
    let end_snap = snap(&route, &route.proto.end);
    RouteEvent::added(route, begin_snap, end_snap)
}

/// The waypoint moved onto the resolved geometry, or `None` when the geometry already passes
/// through the waypoint's location.
fn snap(route: &GeometryRoute, waypoint: &Waypoint) -> Option<Waypoint> {
    let closest = route.geometry.closest_point(&waypoint.location)?;
    if closest == waypoint.location {
        None
    } else {
        Some(Waypoint::new(waypoint.id, closest))
    }
}
