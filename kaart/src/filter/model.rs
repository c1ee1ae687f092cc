//! The filter expression model.
//!
//! The types here make illegal trees unrepresentable: a conjunction always has exactly two
//! comparisons, a disjunction exactly two conjunctions. The generators in [`super::text`] rely
//! on this and never fail.

use serde::{Deserialize, Serialize};

/// A feature filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches every feature.
    Pure,
    /// A named filter expression.
    Expression {
        /// User-facing name of the filter.
        name: String,
        /// The filter expression.
        expression: FilterExpression,
    },
}

impl Filter {
    /// Creates a named expression filter.
    pub fn expression(name: impl Into<String>, expression: impl Into<FilterExpression>) -> Self {
        Filter::Expression {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Top level of the (deliberately shallow) filter grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpression {
    /// Two comparisons that must both hold.
    Conjunction(Conjunction),
    /// Two conjunctions of which at least one must hold.
    Disjunction(Disjunction),
    /// A single comparison.
    Comparison(Comparison),
}

/// `left AND right` over exactly two comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conjunction {
    /// Left operand.
    pub left: Comparison,
    /// Right operand.
    pub right: Comparison,
}

impl Conjunction {
    /// Creates a conjunction of two comparisons.
    pub fn new(left: Comparison, right: Comparison) -> Self {
        Self { left, right }
    }
}

/// `left OR right` over exactly two conjunctions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disjunction {
    /// Left operand.
    pub left: Conjunction,
    /// Right operand.
    pub right: Conjunction,
}

impl Disjunction {
    /// Creates a disjunction of two conjunctions.
    pub fn new(left: Conjunction, right: Conjunction) -> Self {
        Self { left, right }
    }
}

/// A comparison of a feature property against a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Comparison {
    /// The property value equals the constant.
    Equality {
        /// The compared property.
        property: Property,
        /// The constant to compare against.
        value: FilterLiteral,
    },
    /// The property value differs from the constant.
    Inequality {
        /// The compared property.
        property: Property,
        /// The constant to compare against.
        value: FilterLiteral,
    },
}

impl Comparison {
    /// Creates an equality comparison.
    pub fn equality(property: Property, value: FilterLiteral) -> Self {
        Comparison::Equality { property, value }
    }

    /// Creates an inequality comparison.
    pub fn inequality(property: Property, value: FilterLiteral) -> Self {
        Comparison::Inequality { property, value }
    }
}

impl From<Comparison> for FilterExpression {
    fn from(comparison: Comparison) -> Self {
        FilterExpression::Comparison(comparison)
    }
}

impl From<Conjunction> for FilterExpression {
    fn from(conjunction: Conjunction) -> Self {
        FilterExpression::Conjunction(conjunction)
    }
}

impl From<Disjunction> for FilterExpression {
    fn from(disjunction: Disjunction) -> Self {
        FilterExpression::Disjunction(disjunction)
    }
}

/// Type of a feature field a filter can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text field.
    String,
    /// Integer field.
    Integer,
    /// Floating point field.
    Double,
    /// Boolean field.
    Boolean,
    /// Calendar date field.
    Date,
    /// Date/time field.
    DateTime,
    /// Geometry field.
    Geometry,
    /// Arbitrary JSON field.
    Json,
}

/// A reference to a feature property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Type of the referenced field.
    pub field_type: FieldType,
    /// Name of the referenced field.
    pub reference: String,
}

impl Property {
    /// Creates a property reference.
    pub fn new(field_type: FieldType, reference: impl Into<String>) -> Self {
        Self {
            field_type,
            reference: reference.into(),
        }
    }
}

/// A constant a filter compares a property against. The variant fixes both the field type and the
/// value representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterLiteral {
    /// Text constant.
    String(String),
    /// Integer constant.
    Integer(i64),
    /// Floating point constant.
    Double(f64),
    /// Boolean constant.
    Boolean(bool),
    /// Date constant in ISO notation.
    Date(String),
    /// Date/time constant in ISO notation.
    DateTime(String),
    /// Geometry constant in well-known text.
    Geometry(String),
    /// JSON constant.
    Json(String),
}
