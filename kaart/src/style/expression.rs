//! Expression model of the `awv-v0` style language.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Static type of a style expression.
///
/// Every expression node, once compiled, produces values of exactly one of these types. Which
/// node combinations are allowed is checked at compile time, see [`super::compile_style`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// `true` or `false`.
    Boolean,
    /// UTF-8 string.
    String,
    /// 64-bit float.
    Number,
}

impl TypeTag {
    /// Name of the type as it appears in style definitions and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::String => "string",
            TypeTag::Number => "number",
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A runtime value produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Boolean value.
    Boolean(bool),
    /// String value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl StyleValue {
    /// The static type of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            StyleValue::Boolean(_) => TypeTag::Boolean,
            StyleValue::String(_) => TypeTag::String,
            StyleValue::Number(_) => TypeTag::Number,
        }
    }

    pub(crate) fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// Comparison operators of the style language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKind {
    /// `<`, numbers only.
    Lt,
    /// `<=`, numbers only.
    Le,
    /// `>`, numbers only.
    Gt,
    /// `>=`, numbers only.
    Ge,
    /// `==`, operands of any single type.
    Eq,
    /// `!=`, operands of any single type.
    Ne,
    /// `L==`, strings only. Lower-cases the *left* operand before comparing; the right operand is
    /// compared as is. The asymmetry is intentional: definitions compare a feature property on the
    /// left to an already lower-cased constant on the right.
    CaseInsensitiveEq,
}

/// Boolean combinators of the style language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationKind {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// What kind of presence an [`Expression::Exists`] node checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistsKind {
    /// A feature property with the given key exists.
    Property,
    /// An environment variable with the given name exists.
    Environment,
}

/// A node of the style expression tree.
///
/// Expression trees are immutable once parsed; nodes are never shared between trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant value.
    Literal(StyleValue),
    /// Extracts a feature property by a dot-separated path. Produces no value when the property
    /// is missing or has a different runtime type than declared.
    Property {
        /// Declared type of the property value.
        type_tag: TypeTag,
        /// Dot-separated property path.
        reference: String,
    },
    /// Extracts a value from the evaluation environment. Only `resolution` with type `number` is
    /// supported.
    Environment {
        /// Declared type of the environment value.
        type_tag: TypeTag,
        /// Name of the environment variable.
        reference: String,
    },
    /// Checks presence of a property or an environment variable.
    Exists {
        /// Property or environment check.
        kind: ExistsKind,
        /// Key or variable to check.
        reference: String,
    },
    /// Compares the results of two sub-expressions.
    Comparison {
        /// The operator.
        kind: ComparisonKind,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// Combines two boolean sub-expressions.
    Combination {
        /// The combinator.
        kind: CombinationKind,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// Negates a boolean sub-expression.
    Negation {
        /// The negated expression.
        expression: Box<Expression>,
    },
    /// Checks that `lower <= value <= upper`, all bounds inclusive. All three operands must be
    /// numbers.
    Between {
        /// The checked value.
        value: Box<Expression>,
        /// Inclusive lower bound.
        lower: Box<Expression>,
        /// Inclusive upper bound.
        upper: Box<Expression>,
    },
}

impl Expression {
    /// The condition used for rules that don't declare one.
    pub(crate) fn always_true() -> Self {
        Expression::Literal(StyleValue::Boolean(true))
    }
}

/// Opaque style payload of a rule.
///
/// The core never interprets style definitions; it hands the payload of the first matching rule
/// back to the rendering collaborator as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDef(pub serde_json::Value);

/// A single condition → style rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Condition that must hold for the style to apply. Must type-check to a boolean.
    pub condition: Expression,
    /// Style applied when the condition holds.
    pub style: StyleDef,
}

/// Ordered list of rules. The first rule whose condition holds determines a feature's style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    /// The rules, in declaration order.
    pub rules: Vec<Rule>,
}
