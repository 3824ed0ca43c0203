//! `py://` arguments.

use serde_json::{Map, Value};

use crate::error::{ContentOrigin, LocationError};
use crate::location::RawItem;
use crate::namespace::{Namespace, NamespaceValue};

/// Look up `name` and serialize its value as the only item.
///
/// # Errors
///
/// - [`LocationError::UndefinedVariable`] if no namespace is configured or
///   `name` is not bound in it
/// - [`LocationError::UnsupportedVariableType`] if the value is neither a
///   string, a mapping nor a sequence
pub fn resolve_variable(
    name: &str,
    namespace: Option<&dyn Namespace>,
) -> Result<Vec<RawItem>, LocationError> {
    let value = namespace
        .filter(|ns| ns.has(name))
        .and_then(|ns| ns.get(name))
        .ok_or_else(|| LocationError::UndefinedVariable {
            name: name.to_owned(),
        })?;
    Ok(vec![RawItem::Content(serialize_variable(name, value)?)])
}

/// Serialize a variable for use as transform input.
///
/// Strings pass through unchanged. Mappings and sequences are encoded as
/// compact JSON with object keys sorted at every depth, so equal values always
/// produce identical text.
///
/// # Errors
///
/// Returns [`LocationError::UnsupportedVariableType`] for any other value.
pub fn serialize_variable(name: &str, value: &NamespaceValue) -> Result<String, LocationError> {
    match value {
        NamespaceValue::Json(Value::String(s)) => Ok(s.clone()),
        NamespaceValue::Json(v @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string(&canonicalize(v))
                .map_err(|e| LocationError::malformed(ContentOrigin::document(name), e))
        }
        other => Err(LocationError::UnsupportedVariableType {
            name: name.to_owned(),
            type_name: other.type_name().to_owned(),
        }),
    }
}

/// Copy of `value` with the keys of every object in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
