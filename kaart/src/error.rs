//! Error types used by the crate.

use thiserror::Error;

/// Kaart error type.
#[derive(Debug, Clone, Error)]
pub enum KaartError {
    /// A style definition was rejected by the parser or the type checker. The contained messages
    /// describe every problem found along the failing decode path.
    #[error("invalid style definition: {}", .0.join("; "))]
    InvalidStyle(Vec<String>),
    /// A routing service could not resolve a route.
    #[error("routing failed: {0}")]
    Routing(String),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}
