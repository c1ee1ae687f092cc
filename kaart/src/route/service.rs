//! Routing service capability used to resolve proto routes into geometries.

use kaart_types::LineString;

use super::proto::{GeometryRoute, ProtoRoute};
use crate::error::KaartError;

/// Resolves the geometry of a route segment between two waypoints.
///
/// Resolution is asynchronous and may complete in any order relative to other in-flight
/// resolutions; the engine's staleness filter restores a consistent view for consumers. A failed
/// resolution only means the segment never produces its added-event; it does not corrupt the
/// engine's bookkeeping.
#[async_trait::async_trait]
pub trait RoutingService: Send + Sync {
    /// Computes the geometry between the proto route's endpoints.
    async fn resolve(&self, proto: &ProtoRoute) -> Result<GeometryRoute, KaartError>;
}

/// Routing service that connects the waypoints with a straight line.
///
/// This is the resolver used for freehand drawing without a road network, and the fallback for
/// composite setups.
#[derive(Debug, Default)]
pub struct StraightLineRouting;

#[async_trait::async_trait]
impl RoutingService for StraightLineRouting {
    async fn resolve(&self, proto: &ProtoRoute) -> Result<GeometryRoute, KaartError> {
        Ok(GeometryRoute {
            proto: proto.clone(),
            geometry: LineString::new(vec![proto.begin.location, proto.end.location]),
            edges: None,
        })
    }
}

/// Tries multiple routing services in order, from the least to the most specific.
///
/// The result of the last service that succeeds wins; earlier results serve as a fallback when a
/// more specific service (typically a remote road network router) is unavailable. Resolution
/// fails only when every service fails.
pub struct CompositeRouting {
    services: Vec<Box<dyn RoutingService>>,
}

impl CompositeRouting {
    /// Creates a composite over the given services, ordered from least to most specific.
    pub fn new(services: Vec<Box<dyn RoutingService>>) -> Self {
        Self { services }
    }

    /// The usual setup: straight lines as the fallback, the given service as the refinement.
    pub fn with_refined(refined: Box<dyn RoutingService>) -> Self {
        Self::new(vec![Box::new(StraightLineRouting), refined])
    }
}

#[async_trait::async_trait]
impl RoutingService for CompositeRouting {
    async fn resolve(&self, proto: &ProtoRoute) -> Result<GeometryRoute, KaartError> {
        let mut resolved = None;
        for service in &self.services {
            match service.resolve(proto).await {
                Ok(route) => resolved = Some(route),
                Err(error) => {
                    log::warn!("routing service failed for route {}: {error}", proto.id)
                }
            }
        }

        resolved.ok_or_else(|| {
            KaartError::Routing(format!("no routing service could resolve route {}", proto.id))
        })
    }
}
