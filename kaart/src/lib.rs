//! Kaart is the headless core of an embeddable map widget. It contains the parts of the widget
//! that are genuine map logic rather than UI composition; the surrounding UI layer supplies JSON
//! definitions and user interactions, and renders what the core hands back.
//!
//! # Main components
//!
//! * [`style`] — the `awv-v0` style language: JSON rule definitions are validated, type-checked
//!   and compiled once into a [`style::StyleFunction`] that picks a style per feature per render.
//! * [`filter`] — the declarative feature filter model with its CQL and display-text generators,
//!   used to restrict what a feature server returns and to describe the restriction to the user.
//! * [`route`] — the incremental waypoint/route graph engine behind freehand route drawing:
//!   waypoint edits in, versioned route events out, with pluggable geometry resolution.
//!
//! The core performs no rendering, no tile handling and no network transport. Map features are
//! represented only by their [`Feature`] properties, geometries by the types of the
//! [`kaart_types`] crate.

pub mod error;
pub mod feature;
pub mod filter;
pub mod route;
pub mod style;

pub use error::KaartError;
pub use feature::Feature;
