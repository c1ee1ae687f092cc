//! JSON interpreter for the `awv-v0` style definition format.
//!
//! serde derive cannot produce the per-field diagnostics the style contract requires, so
//! definitions are decoded by hand from [`serde_json::Value`]. Decoding fails fast with a
//! descriptive message for the first offending field along each decode path; rule-level messages
//! are prefixed with `syntaxcontrole: `.

use serde_json::Value;

use super::expression::{
    CombinationKind, ComparisonKind, ExistsKind, Expression, Rule, RuleSet, StyleDef, StyleValue,
    TypeTag,
};

/// Decodes the `{"version": "awv-v0", "definition": {"rules": [...]}}` envelope into a rule set.
pub(super) fn decode_style(json: &Value) -> Result<RuleSet, Vec<String>> {
    let version = str_field(json, "version").map_err(|msg| vec![msg])?;
    if version != "awv-v0" {
        return Err(vec![format!("version '{version}' is not supported")]);
    }

    let definition = field(json, "definition").map_err(|msg| vec![msg])?;
    rule_set(definition).map_err(|msg| vec![format!("syntaxcontrole: {msg}")])
}

fn rule_set(json: &Value) -> Result<RuleSet, String> {
    let rules = field(json, "rules")?;
    let Value::Array(rules) = rules else {
        return Err(format!("'{rules}' is not an array"));
    };

    let rules = rules.iter().map(rule).collect::<Result<Vec<_>, _>>()?;
    Ok(RuleSet { rules })
}

fn rule(json: &Value) -> Result<Rule, String> {
    // A rule without a condition applies to every feature.
    let condition = match opt_field(json, "condition")? {
        Some(condition) => expression(condition)?,
        None => Expression::always_true(),
    };
    let style = field(field(json, "style")?, "definition")?;

    Ok(Rule {
        condition,
        style: StyleDef(style.clone()),
    })
}

fn expression(json: &Value) -> Result<Expression, String> {
    let kind = str_field(json, "kind")?;
    match kind {
        "Literal" => Ok(Expression::Literal(literal_value(field(json, "value")?)?)),
        "Property" => Ok(Expression::Property {
            type_tag: type_tag(field(json, "type")?)?,
            reference: str_field(json, "ref")?.to_string(),
        }),
        "Environment" => Ok(Expression::Environment {
            type_tag: type_tag(field(json, "type")?)?,
            reference: str_field(json, "ref")?.to_string(),
        }),
        "PropertyExists" => Ok(Expression::Exists {
            kind: ExistsKind::Property,
            reference: str_field(json, "ref")?.to_string(),
        }),
        "EnvironmentExists" => Ok(Expression::Exists {
            kind: ExistsKind::Environment,
            reference: str_field(json, "ref")?.to_string(),
        }),
        "<" => comparison(json, ComparisonKind::Lt),
        "<=" => comparison(json, ComparisonKind::Le),
        ">" => comparison(json, ComparisonKind::Gt),
        ">=" => comparison(json, ComparisonKind::Ge),
        "==" => comparison(json, ComparisonKind::Eq),
        "!=" => comparison(json, ComparisonKind::Ne),
        "L==" => comparison(json, ComparisonKind::CaseInsensitiveEq),
        "&&" => combination(json, CombinationKind::And),
        "||" => combination(json, CombinationKind::Or),
        "!" => Ok(Expression::Negation {
            expression: Box::new(expression(field(json, "expression")?)?),
        }),
        "<=>" => Ok(Expression::Between {
            value: Box::new(expression(field(json, "value")?)?),
            lower: Box::new(expression(field(json, "lower")?)?),
            upper: Box::new(expression(field(json, "upper")?)?),
        }),
        other => Err(format!("unknown expression kind '{other}'")),
    }
}

fn comparison(json: &Value, kind: ComparisonKind) -> Result<Expression, String> {
    Ok(Expression::Comparison {
        kind,
        left: Box::new(expression(field(json, "left")?)?),
        right: Box::new(expression(field(json, "right")?)?),
    })
}

fn combination(json: &Value, kind: CombinationKind) -> Result<Expression, String> {
    Ok(Expression::Combination {
        kind,
        left: Box::new(expression(field(json, "left")?)?),
        right: Box::new(expression(field(json, "right")?)?),
    })
}

fn type_tag(json: &Value) -> Result<TypeTag, String> {
    match str_value(json)? {
        "boolean" => Ok(TypeTag::Boolean),
        "string" => Ok(TypeTag::String),
        "number" => Ok(TypeTag::Number),
        other => Err(format!(
            "the type must be 'boolean', 'string' or 'number', but '{other}' was found"
        )),
    }
}

fn literal_value(json: &Value) -> Result<StyleValue, String> {
    match json {
        Value::Bool(value) => Ok(StyleValue::Boolean(*value)),
        Value::Number(value) => value
            .as_f64()
            .map(StyleValue::Number)
            .ok_or_else(|| format!("'{json}' is not a representable number")),
        Value::String(value) => Ok(StyleValue::String(value.clone())),
        _ => Err(format!("'{json}' is not a boolean, number or string")),
    }
}

fn field<'a>(json: &'a Value, name: &str) -> Result<&'a Value, String> {
    let Value::Object(object) = json else {
        return Err(format!("'{json}' is not an object"));
    };
    object
        .get(name)
        .ok_or_else(|| format!("field '{name}' is missing"))
}

fn opt_field<'a>(json: &'a Value, name: &str) -> Result<Option<&'a Value>, String> {
    let Value::Object(object) = json else {
        return Err(format!("'{json}' is not an object"));
    };
    Ok(object.get(name).filter(|value| !value.is_null()))
}

fn str_value(json: &Value) -> Result<&str, String> {
    json.as_str()
        .ok_or_else(|| format!("'{json}' is not a string"))
}

fn str_field<'a>(json: &'a Value, name: &str) -> Result<&'a str, String> {
    str_value(field(json, name)?)
}
