//! CQL and display-text generation for filters.
//!
//! Both generators are total: every well-formed [`Filter`] value produces a string. A malformed
//! tree cannot be constructed through the model's API, so no runtime validation happens here.

use super::model::{Comparison, FieldType, Filter, FilterExpression, FilterLiteral, Property};

/// Renders the filter as a CQL query string, suitable for a feature server request.
///
/// The pure filter renders as the empty string (no query restriction).
pub fn cql(filter: &Filter) -> String {
    match filter {
        Filter::Pure => String::new(),
        Filter::Expression { expression, .. } => expression_cql(expression),
    }
}

/// Renders the filter as human readable text for display in the filter UI.
pub fn display_text(filter: &Filter) -> String {
    match filter {
        Filter::Pure => "alle waarden".to_string(),
        Filter::Expression { expression, .. } => expression_text(expression),
    }
}

fn expression_cql(expression: &FilterExpression) -> String {
    match expression {
        FilterExpression::Conjunction(conjunction) => format!(
            "{} AND {}",
            comparison_cql(&conjunction.left),
            comparison_cql(&conjunction.right)
        ),
        FilterExpression::Disjunction(disjunction) => format!(
            "{} OR {}",
            expression_cql(&FilterExpression::Conjunction(disjunction.left.clone())),
            expression_cql(&FilterExpression::Conjunction(disjunction.right.clone()))
        ),
        FilterExpression::Comparison(comparison) => comparison_cql(comparison),
    }
}

fn comparison_cql(comparison: &Comparison) -> String {
    match comparison {
        Comparison::Equality { property, value } => {
            format!("{} = {}", property_cql(property), literal_cql(value))
        }
        Comparison::Inequality { property, value } => {
            format!("{} <> {}", property_cql(property), literal_cql(value))
        }
    }
}

fn property_cql(property: &Property) -> String {
    format!("properties.{}", property.reference)
}

fn literal_cql(literal: &FilterLiteral) -> String {
    match literal {
        FilterLiteral::Boolean(value) => if *value { "true" } else { "false" }.to_string(),
        FilterLiteral::String(value) => format!("'{value}'"),
        FilterLiteral::Integer(value) => value.to_string(),
        FilterLiteral::Double(value) => value.to_string(),
        // Everything else is passed to the server as a quoted string.
        FilterLiteral::Date(value)
        | FilterLiteral::DateTime(value)
        | FilterLiteral::Geometry(value)
        | FilterLiteral::Json(value) => format!("'{value}'"),
    }
}

fn expression_text(expression: &FilterExpression) -> String {
    match expression {
        FilterExpression::Conjunction(conjunction) => format!(
            "{} en {}",
            comparison_text(&conjunction.left),
            comparison_text(&conjunction.right)
        ),
        FilterExpression::Disjunction(disjunction) => format!(
            "{} of {}",
            expression_text(&FilterExpression::Conjunction(disjunction.left.clone())),
            expression_text(&FilterExpression::Conjunction(disjunction.right.clone()))
        ),
        FilterExpression::Comparison(comparison) => comparison_text(comparison),
    }
}

fn comparison_text(comparison: &Comparison) -> String {
    match comparison {
        Comparison::Equality { property, value } => {
            format!("{} = {}", property.reference, literal_text(value))
        }
        Comparison::Inequality { property, value } => {
            format!("{} != {}", property.reference, literal_text(value))
        }
    }
}

fn literal_text(literal: &FilterLiteral) -> String {
    match literal {
        FilterLiteral::Boolean(value) => if *value { "waar" } else { "vals" }.to_string(),
        FilterLiteral::String(value) => format!("'{value}'"),
        FilterLiteral::Integer(value) => value.to_string(),
        FilterLiteral::Double(value) => value.to_string(),
        FilterLiteral::Date(value) | FilterLiteral::DateTime(value) => value.clone(),
        FilterLiteral::Geometry(_) => "<geometrie>".to_string(),
        FilterLiteral::Json(_) => "<json>".to_string(),
    }
}
