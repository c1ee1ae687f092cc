//! Type checking and compilation of rule sets into executable style functions.

use std::fmt::{Debug, Formatter};

use serde_json::Value;

use super::expression::{
    CombinationKind, ComparisonKind, ExistsKind, Expression, RuleSet, StyleDef, StyleValue,
    TypeTag,
};
use crate::feature::Feature;

/// Everything an evaluator can read at runtime: the feature and the map resolution.
struct EvalContext<'a> {
    feature: &'a Feature,
    resolution: f64,
}

/// A compiled expression node. Maps the runtime context to maybe a value; a property that is
/// missing or has the wrong runtime type produces `None`, which propagates up through the
/// enclosing operators.
type Evaluator = Box<dyn Fn(&EvalContext) -> Option<StyleValue> + Send + Sync>;

/// An evaluator together with the static type of the values it produces. The type is only needed
/// during compilation to reject combinations of incompatible operands.
struct TypedEvaluator {
    evaluator: Evaluator,
    type_tag: TypeTag,
}

impl std::fmt::Debug for TypedEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedEvaluator")
            .field("type_tag", &self.type_tag)
            .finish_non_exhaustive()
    }
}

/// A compiled `awv-v0` style function.
///
/// Produced once at layer configuration time by [`super::compile_style`]. Evaluation is free of
/// side effects and reentrant, so one instance can be shared between callers without
/// synchronization.
pub struct StyleFunction {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    condition: Evaluator,
    style: StyleDef,
}

impl StyleFunction {
    /// Style of the first rule whose condition evaluates to `true` for the given feature and map
    /// resolution, in rule declaration order.
    ///
    /// A condition that produces no value (e.g. because of a missing property) counts as not
    /// satisfied and the next rule is tried; it never fails the whole function. `None` means no
    /// rule matched and the renderer's fallback style applies.
    ///
    /// The result is re-derived on every call. Caching per feature, if desired, is a rendering
    /// layer concern.
    pub fn eval(&self, feature: &Feature, resolution: f64) -> Option<&StyleDef> {
        let ctx = EvalContext {
            feature,
            resolution,
        };
        self.rules
            .iter()
            .find(|rule| (rule.condition)(&ctx).and_then(|value| value.as_bool()) == Some(true))
            .map(|rule| &rule.style)
    }
}

impl Debug for StyleFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleFunction")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Type-checks and compiles every rule of the set. Fails on the first rule that does not
/// type-check; no partial style function is ever produced.
pub(super) fn compile_rules(rule_set: RuleSet) -> Result<StyleFunction, Vec<String>> {
    let mut rules = Vec::with_capacity(rule_set.rules.len());
    for rule in rule_set.rules {
        let condition = compile(&rule.condition).map_err(|msg| vec![msg])?;
        if condition.type_tag != TypeTag::Boolean {
            return Err(vec![format!(
                "typecontrole: a condition must produce a 'boolean', but '{}' was found",
                condition.type_tag
            )]);
        }

        rules.push(CompiledRule {
            condition: condition.evaluator,
            style: rule.style,
        });
    }

    Ok(StyleFunction { rules })
}

/// The heart of the compiler: recursively turns an expression tree into a closure tree, checking
/// operand types bottom-up.
fn compile(expression: &Expression) -> Result<TypedEvaluator, String> {
    match expression {
        Expression::Literal(value) => {
            let type_tag = value.type_tag();
            let value = value.clone();
            Ok(TypedEvaluator {
                evaluator: Box::new(move |_| Some(value.clone())),
                type_tag,
            })
        }
        Expression::Property {
            type_tag,
            reference,
        } => {
            let type_tag = *type_tag;
            let path = reference.clone();
            Ok(TypedEvaluator {
                evaluator: Box::new(move |ctx| {
                    property_value(ctx.feature.property(&path)?, type_tag)
                }),
                type_tag,
            })
        }
        Expression::Environment {
            type_tag,
            reference,
        } => {
            if reference == "resolution" && *type_tag == TypeTag::Number {
                Ok(TypedEvaluator {
                    evaluator: Box::new(|ctx| Some(StyleValue::Number(ctx.resolution))),
                    type_tag: TypeTag::Number,
                })
            } else {
                Err(format!(
                    "only 'resolution' with type 'number' is supported, \
                     but '{reference}' with type '{type_tag}' was found"
                ))
            }
        }
        Expression::Exists {
            kind: ExistsKind::Property,
            reference,
        } => {
            let key = reference.clone();
            Ok(TypedEvaluator {
                evaluator: Box::new(move |ctx| {
                    Some(StyleValue::Boolean(ctx.feature.has_property(&key)))
                }),
                type_tag: TypeTag::Boolean,
            })
        }
        Expression::Exists {
            kind: ExistsKind::Environment,
            reference,
        } => {
            // Which environment variables exist is known at compile time already.
            let exists = reference == "resolution";
            Ok(TypedEvaluator {
                evaluator: Box::new(move |_| Some(StyleValue::Boolean(exists))),
                type_tag: TypeTag::Boolean,
            })
        }
        Expression::Comparison { kind, left, right } => {
            let left = compile(left)?;
            let right = compile(right)?;
            match kind {
                ComparisonKind::Lt => numeric_comparison(left, right, |a, b| a < b),
                ComparisonKind::Le => numeric_comparison(left, right, |a, b| a <= b),
                ComparisonKind::Gt => numeric_comparison(left, right, |a, b| a > b),
                ComparisonKind::Ge => numeric_comparison(left, right, |a, b| a >= b),
                ComparisonKind::Eq => {
                    expect_equal(left.type_tag, right.type_tag)?;
                    Ok(apply2(left, right, TypeTag::Boolean, |a, b| {
                        Some(StyleValue::Boolean(a == b))
                    }))
                }
                ComparisonKind::Ne => {
                    expect_equal(left.type_tag, right.type_tag)?;
                    Ok(apply2(left, right, TypeTag::Boolean, |a, b| {
                        Some(StyleValue::Boolean(a != b))
                    }))
                }
                ComparisonKind::CaseInsensitiveEq => {
                    expect_both(left.type_tag, right.type_tag, TypeTag::String)?;
                    // Only the left operand is lower-cased. The right operand is expected to be
                    // an already lower-cased constant.
                    Ok(apply2(left, right, TypeTag::Boolean, |a, b| {
                        Some(StyleValue::Boolean(
                            a.as_str()?.to_lowercase() == b.as_str()?,
                        ))
                    }))
                }
            }
        }
        Expression::Combination { kind, left, right } => {
            let left = compile(left)?;
            let right = compile(right)?;
            expect_both(left.type_tag, right.type_tag, TypeTag::Boolean)?;
            let op: fn(bool, bool) -> bool = match kind {
                CombinationKind::And => |a, b| a && b,
                CombinationKind::Or => |a, b| a || b,
            };
            Ok(apply2(left, right, TypeTag::Boolean, move |a, b| {
                Some(StyleValue::Boolean(op(a.as_bool()?, b.as_bool()?)))
            }))
        }
        Expression::Negation { expression } => {
            let inner = compile(expression)?;
            expect_type(inner.type_tag, TypeTag::Boolean)?;
            let evaluator = inner.evaluator;
            Ok(TypedEvaluator {
                evaluator: Box::new(move |ctx| {
                    Some(StyleValue::Boolean(!evaluator(ctx)?.as_bool()?))
                }),
                type_tag: TypeTag::Boolean,
            })
        }
        Expression::Between {
            value,
            lower,
            upper,
        } => {
            let value = compile(value)?;
            let lower = compile(lower)?;
            let upper = compile(upper)?;
            expect_all3(
                value.type_tag,
                lower.type_tag,
                upper.type_tag,
                TypeTag::Number,
            )?;
            let (ev, el, eu) = (value.evaluator, lower.evaluator, upper.evaluator);
            Ok(TypedEvaluator {
                evaluator: Box::new(move |ctx| {
                    let v = ev(ctx)?.as_number()?;
                    let l = el(ctx)?.as_number()?;
                    let u = eu(ctx)?.as_number()?;
                    Some(StyleValue::Boolean(v >= l && v <= u))
                }),
                type_tag: TypeTag::Boolean,
            })
        }
    }
}

/// Chains two evaluators into one. Both operands are always evaluated; if either produces no
/// value, so does the combined evaluator.
fn apply2(
    left: TypedEvaluator,
    right: TypedEvaluator,
    result_type: TypeTag,
    op: impl Fn(StyleValue, StyleValue) -> Option<StyleValue> + Send + Sync + 'static,
) -> TypedEvaluator {
    let (left, right) = (left.evaluator, right.evaluator);
    TypedEvaluator {
        evaluator: Box::new(move |ctx| op(left(ctx)?, right(ctx)?)),
        type_tag: result_type,
    }
}

fn numeric_comparison(
    left: TypedEvaluator,
    right: TypedEvaluator,
    op: impl Fn(f64, f64) -> bool + Send + Sync + 'static,
) -> Result<TypedEvaluator, String> {
    expect_both(left.type_tag, right.type_tag, TypeTag::Number)?;
    Ok(apply2(left, right, TypeTag::Boolean, move |a, b| {
        Some(StyleValue::Boolean(op(a.as_number()?, b.as_number()?)))
    }))
}

/// Converts a JSON property value into a style value, filtering out values whose runtime type
/// does not match the declared one. No coercion is performed.
fn property_value(json: &Value, type_tag: TypeTag) -> Option<StyleValue> {
    match (json, type_tag) {
        (Value::Bool(value), TypeTag::Boolean) => Some(StyleValue::Boolean(*value)),
        (Value::String(value), TypeTag::String) => Some(StyleValue::String(value.clone())),
        (Value::Number(value), TypeTag::Number) => value.as_f64().map(StyleValue::Number),
        _ => None,
    }
}

fn expect_type(found: TypeTag, expected: TypeTag) -> Result<(), String> {
    if found == expected {
        Ok(())
    } else {
        Err(format!(
            "typecontrole: '{found}' found, but '{expected}' expected"
        ))
    }
}

fn expect_both(t1: TypeTag, t2: TypeTag, expected: TypeTag) -> Result<(), String> {
    if t1 == expected && t2 == expected {
        Ok(())
    } else {
        Err(format!(
            "typecontrole: '{t1}' and '{t2}' found, but '{expected}' expected for both"
        ))
    }
}

fn expect_all3(t1: TypeTag, t2: TypeTag, t3: TypeTag, expected: TypeTag) -> Result<(), String> {
    if t1 == expected && t2 == expected && t3 == expected {
        Ok(())
    } else {
        Err(format!(
            "typecontrole: '{t1}', '{t2}' and '{t3}' found, but '{expected}' expected for all"
        ))
    }
}

fn expect_equal(t1: TypeTag, t2: TypeTag) -> Result<(), String> {
    if t1 == t2 {
        Ok(())
    } else {
        Err(format!(
            "typecontrole: expected '{t1}' and '{t2}' to be equal"
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::style::expression::Rule;

    fn feature(properties: Value) -> Feature {
        let Value::Object(properties) = properties else {
            panic!("not an object");
        };
        Feature::new(properties)
    }

    fn literal(value: StyleValue) -> Expression {
        Expression::Literal(value)
    }

    fn num(value: f64) -> Expression {
        literal(StyleValue::Number(value))
    }

    fn string(value: &str) -> Expression {
        literal(StyleValue::String(value.to_string()))
    }

    fn comparison(kind: ComparisonKind, left: Expression, right: Expression) -> Expression {
        Expression::Comparison {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn eval(expression: &Expression, feature: &Feature, resolution: f64) -> Option<StyleValue> {
        let compiled = compile(expression).expect("compilation failed");
        (compiled.evaluator)(&EvalContext {
            feature,
            resolution,
        })
    }

    fn eval_static(expression: &Expression) -> Option<StyleValue> {
        eval(expression, &Feature::default(), 1.0)
    }

    #[test]
    fn literal_type_is_derived_from_the_value() {
        for (value, expected) in [
            (StyleValue::Boolean(true), TypeTag::Boolean),
            (StyleValue::String("x".to_string()), TypeTag::String),
            (StyleValue::Number(1.5), TypeTag::Number),
        ] {
            let compiled = compile(&literal(value)).expect("compilation failed");
            assert_eq!(compiled.type_tag, expected);
        }
    }

    #[test]
    fn numeric_comparison_requires_numbers() {
        let error = compile(&comparison(ComparisonKind::Lt, num(1.0), string("x")))
            .expect_err("compilation succeeded");
        assert_eq!(
            error,
            "typecontrole: 'number' and 'string' found, but 'number' expected for both"
        );
    }

    #[test]
    fn equality_requires_equal_types_without_coercion() {
        let error = compile(&comparison(
            ComparisonKind::Eq,
            num(1.0),
            literal(StyleValue::Boolean(true)),
        ))
        .expect_err("compilation succeeded");
        assert_eq!(
            error,
            "typecontrole: expected 'number' and 'boolean' to be equal"
        );
    }

    #[test]
    fn case_insensitive_equality_lower_cases_only_the_left_operand() {
        let forward = comparison(ComparisonKind::CaseInsensitiveEq, string("ABC"), string("abc"));
        let backward = comparison(ComparisonKind::CaseInsensitiveEq, string("abc"), string("ABC"));

        assert_eq!(eval_static(&forward), Some(StyleValue::Boolean(true)));
        assert_eq!(eval_static(&backward), Some(StyleValue::Boolean(false)));
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        for (value, expected) in [(5.0, true), (10.0, true), (4.999, false), (10.001, false)] {
            let expression = Expression::Between {
                value: Box::new(num(value)),
                lower: Box::new(num(5.0)),
                upper: Box::new(num(10.0)),
            };
            assert_eq!(
                eval_static(&expression),
                Some(StyleValue::Boolean(expected)),
                "between(5, {value}, 10)"
            );
        }
    }

    #[test]
    fn missing_property_propagates_as_no_value() {
        let expression = comparison(
            ComparisonKind::Eq,
            Expression::Property {
                type_tag: TypeTag::String,
                reference: "naam".to_string(),
            },
            string("Jan"),
        );

        assert_eq!(eval(&expression, &Feature::default(), 1.0), None);
        assert_eq!(
            eval(&expression, &feature(json!({ "naam": "Jan" })), 1.0),
            Some(StyleValue::Boolean(true))
        );
    }

    #[test]
    fn property_with_wrong_runtime_type_produces_no_value() {
        let expression = Expression::Property {
            type_tag: TypeTag::Number,
            reference: "naam".to_string(),
        };
        assert_eq!(eval(&expression, &feature(json!({ "naam": "Jan" })), 1.0), None);
    }

    #[test]
    fn combination_requires_both_operands_to_produce_a_value() {
        // `false && <no value>` is no value, not `false`. Operands are always fully evaluated.
        let expression = Expression::Combination {
            kind: CombinationKind::And,
            left: Box::new(literal(StyleValue::Boolean(false))),
            right: Box::new(comparison(
                ComparisonKind::Eq,
                Expression::Property {
                    type_tag: TypeTag::String,
                    reference: "naam".to_string(),
                },
                string("Jan"),
            )),
        };

        assert_eq!(eval(&expression, &Feature::default(), 1.0), None);
    }

    #[test]
    fn environment_resolution_is_supplied_at_evaluation_time() {
        let expression = comparison(
            ComparisonKind::Lt,
            Expression::Environment {
                type_tag: TypeTag::Number,
                reference: "resolution".to_string(),
            },
            num(32.0),
        );

        assert_eq!(
            eval(&expression, &Feature::default(), 16.0),
            Some(StyleValue::Boolean(true))
        );
        assert_eq!(
            eval(&expression, &Feature::default(), 64.0),
            Some(StyleValue::Boolean(false))
        );
    }

    #[test]
    fn unknown_environment_reference_is_rejected() {
        let expression = Expression::Environment {
            type_tag: TypeTag::Number,
            reference: "zoom".to_string(),
        };
        let error = compile(&expression).expect_err("compilation succeeded");
        assert!(error.contains("'zoom'"), "unexpected message: {error}");
    }

    #[test]
    fn environment_exists_is_folded_at_compile_time() {
        let exists = Expression::Exists {
            kind: ExistsKind::Environment,
            reference: "resolution".to_string(),
        };
        let missing = Expression::Exists {
            kind: ExistsKind::Environment,
            reference: "zoom".to_string(),
        };

        assert_eq!(eval_static(&exists), Some(StyleValue::Boolean(true)));
        assert_eq!(eval_static(&missing), Some(StyleValue::Boolean(false)));
    }

    #[test]
    fn property_exists_checks_key_presence_not_value_type() {
        let expression = Expression::Exists {
            kind: ExistsKind::Property,
            reference: "naam".to_string(),
        };

        assert_eq!(
            eval(&expression, &feature(json!({ "naam": 42 })), 1.0),
            Some(StyleValue::Boolean(true))
        );
        assert_eq!(
            eval(&expression, &Feature::default(), 1.0),
            Some(StyleValue::Boolean(false))
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let rule = |threshold: f64, style: &str| Rule {
            condition: comparison(
                ComparisonKind::Ge,
                Expression::Property {
                    type_tag: TypeTag::Number,
                    reference: "breedte".to_string(),
                },
                num(threshold),
            ),
            style: StyleDef(json!(style)),
        };

        let function = compile_rules(RuleSet {
            rules: vec![rule(10.0, "wide"), rule(5.0, "medium"), rule(0.0, "narrow")],
        })
        .expect("compilation failed");

        assert_eq!(
            function.eval(&feature(json!({ "breedte": 7.0 })), 1.0),
            Some(&StyleDef(json!("medium")))
        );
        assert_eq!(
            function.eval(&feature(json!({ "breedte": 12.0 })), 1.0),
            Some(&StyleDef(json!("wide")))
        );
        // No property: every condition is unsatisfied, no style is returned.
        assert_eq!(function.eval(&Feature::default(), 1.0), None);
    }

    #[test]
    fn non_boolean_condition_is_rejected() {
        let error = compile_rules(RuleSet {
            rules: vec![Rule {
                condition: num(42.0),
                style: StyleDef(json!({})),
            }],
        })
        .expect_err("compilation succeeded");

        assert_eq!(
            error,
            vec![
                "typecontrole: a condition must produce a 'boolean', but 'number' was found"
                    .to_string()
            ]
        );
    }
}
