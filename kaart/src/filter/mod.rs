//! Declarative feature filters and their query-text generation.
//!
//! Filters are built by a UI collaborator (a filter builder component) and consumed by the
//! [`cql`] and [`display_text`] generators. The grammar is deliberately shallow: a filter is
//! either "everything" or a named expression of at most two disjunction levels. This keeps the
//! builder UI simple and makes the generators total functions.

mod model;
mod text;

pub use model::{
    Comparison, Conjunction, Disjunction, FieldType, Filter, FilterExpression, FilterLiteral,
    Property,
};
pub use text::{cql, display_text};
