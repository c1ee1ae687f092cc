//! Incremental waypoint/route graph engine used for freehand route drawing.
//!
//! A drawing tool streams [`WaypointOperation`]s into the engine. For every operation the engine
//! computes the minimal set of route segments to add and remove, resolves added segments through
//! a [`RoutingService`], and emits [`RouteEvent`]s for the rendering layer. Segment versions make
//! the event stream safe under out-of-order asynchronous resolution: a consumer never observes a
//! stale geometry after a later edit.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kaart::route::{direct_routes, Waypoint, WaypointOperation};
//! use kaart_types::Coordinate;
//! use tokio::sync::mpsc;
//!
//! # async fn example() {
//! let (operations, receiver) = mpsc::channel(16);
//! let mut events = direct_routes(receiver);
//!
//! operations
//!     .send(WaypointOperation::Add {
//!         waypoint: Waypoint::new(1u64, Coordinate::new(0.0, 0.0)),
//!         previous: None,
//!     })
//!     .await
//!     .unwrap();
//!
//! while let Some(event) = events.recv().await {
//!     // hand the event to the rendering layer
//! }
//! # }
//! ```

mod pipeline;
mod proto;
mod service;
mod state;
mod waypoint;

pub use pipeline::{custom_routes, direct_routes, route_events};
pub use proto::{GeometryRoute, ProtoRoute, RouteEvent, RouteId, Versions};
pub use service::{CompositeRouting, RoutingService, StraightLineRouting};
pub use state::{RouteChanges, RouteState};
pub use waypoint::{Waypoint, WaypointId, WaypointOperation};
