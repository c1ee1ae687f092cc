//! Map features that style functions and filters are evaluated against.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A map feature with a set of (possibly nested) properties.
///
/// The core does not render features and does not care about their geometries. The only thing
/// style evaluation needs is access to the feature's property values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    properties: Map<String, Value>,
}

impl Feature {
    /// Creates a feature with the given properties.
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    /// Creates a feature from a JSON value.
    ///
    /// Non-object values yield a feature without properties.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(properties) => Self { properties },
            _ => Self::default(),
        }
    }

    /// Properties of the feature.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Looks up a property value by a dot-separated path (`"a.b.c"` selects
    /// `properties["a"]["b"]["c"]`).
    ///
    /// Returns `None` if any segment of the path is missing, points into a non-object value, or
    /// resolves to JSON `null`.
    pub fn property(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.properties.get(segments.next()?)?;
        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }

        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    /// Whether the feature has a property with the given top-level key.
    ///
    /// Note that in contrast to [`Feature::property`] this does not interpret dots in the key and
    /// does not look at the value, so a property that is explicitly set to `null` still exists.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}
