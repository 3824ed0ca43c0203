//! Host variable namespace consulted by `py://` arguments.

use std::collections::BTreeMap;

use serde_json::Value;

/// A value held by the host namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceValue {
    /// A JSON-representable value (string, mapping, sequence or scalar).
    Json(Value),
    /// A host object with no JSON form, known only by its type name.
    Opaque {
        /// Host type name, used in diagnostics.
        type_name: String,
    },
}

impl NamespaceValue {
    /// Type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Json(Value::Null) => "null",
            Self::Json(Value::Bool(_)) => "bool",
            Self::Json(Value::Number(_)) => "number",
            Self::Json(Value::String(_)) => "string",
            Self::Json(Value::Array(_)) => "sequence",
            Self::Json(Value::Object(_)) => "mapping",
            Self::Opaque { type_name } => type_name,
        }
    }
}

impl From<Value> for NamespaceValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for NamespaceValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_owned()))
    }
}

impl From<String> for NamespaceValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

/// Read-only variable lookup.
pub trait Namespace: Send + Sync {
    /// Whether `name` is defined.
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The value bound to `name`.
    fn get(&self, name: &str) -> Option<&NamespaceValue>;
}

/// A namespace backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonNamespace {
    values: BTreeMap<String, NamespaceValue>,
}

impl JsonNamespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every member of a JSON object as a variable.
    ///
    /// Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_json_object(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(
                map.into_iter()
                    .map(|(name, v)| (name, NamespaceValue::Json(v)))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Bind `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<NamespaceValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`JsonNamespace::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<NamespaceValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, NamespaceValue)> for JsonNamespace {
    fn from_iter<I: IntoIterator<Item = (String, NamespaceValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Namespace for JsonNamespace {
    fn get(&self, name: &str) -> Option<&NamespaceValue> {
        self.values.get(name)
    }
}
