//! Rule-based feature styling.
//!
//! A style definition is a JSON document in the `awv-v0` format: an ordered list of rules, each
//! consisting of a boolean condition over feature properties (and the map resolution) and an
//! opaque style payload. [`compile_style`] validates and type-checks the document once, at layer
//! configuration time, and produces a [`StyleFunction`] that is then invoked per feature per
//! render.
//!
//! All validation failures are static: they are reported as a list of human readable messages
//! and the caller may fall back to a default style. After compilation the only possible "failure"
//! at runtime is a condition that is not satisfied, which simply means the next rule is tried.
//!
//! ```
//! use kaart::style::compile_style;
//! use serde_json::json;
//!
//! let definition = json!({
//!     "version": "awv-v0",
//!     "definition": {
//!         "rules": [{
//!             "condition": {
//!                 "kind": ">=",
//!                 "left": { "kind": "Property", "type": "number", "ref": "breedte" },
//!                 "right": { "kind": "Literal", "value": 2.5 },
//!             },
//!             "style": { "definition": { "stroke": "red" } },
//!         }],
//!     },
//! });
//!
//! let style_function = compile_style(&definition).expect("invalid definition");
//! ```

mod compile;
mod decode;
mod expression;

pub use compile::StyleFunction;
pub use expression::{
    CombinationKind, ComparisonKind, ExistsKind, Expression, Rule, RuleSet, StyleDef, StyleValue,
    TypeTag,
};

/// Validates, type-checks and compiles a JSON style definition.
///
/// On failure returns the list of diagnostics collected along the failing decode path. Parse
/// messages are prefixed with `syntaxcontrole: `, type errors with `typecontrole: `.
pub fn compile_style(json: &serde_json::Value) -> Result<StyleFunction, Vec<String>> {
    let rule_set = decode::decode_style(json)?;
    compile::compile_rules(rule_set)
}

/// Same as [`compile_style`], but parses the definition from its JSON text first.
pub fn compile_style_text(text: &str) -> Result<StyleFunction, Vec<String>> {
    let json = serde_json::from_str(text)
        .map_err(|error| vec![format!("the given rule definition was not valid JSON: {error}")])?;
    compile_style(&json)
}
