//! Builds the `py://` namespace from `--vars` and `--var` flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use wstl_location::JsonNamespace;

/// Split `NAME=VALUE` and decode the value.
///
/// The value is parsed as JSON when possible (`--var rows='[1,2]'`) and kept as
/// a plain string otherwise (`--var name=alice`).
///
/// # Errors
///
/// Returns an error if there is no `=` or the name is empty.
pub fn parse_var(raw: &str) -> Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected NAME=VALUE, got '{raw}'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("variable name is empty in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((name.to_owned(), value))
}

/// Namespace from an optional JSON file plus individual bindings.
///
/// Bindings from `vars` are applied after the file, so they override it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON object, or a
/// binding is malformed.
pub fn load_namespace(file: Option<&Path>, vars: &[String]) -> Result<JsonNamespace> {
    let mut namespace = match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read variables file {}", path.display()))?;
            let value: Value = serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in variables file {}", path.display()))?;
            JsonNamespace::from_json_object(value).with_context(|| {
                format!("variables file {} must hold a JSON object", path.display())
            })?
        }
        None => JsonNamespace::new(),
    };

    for raw in vars {
        let (name, value) = parse_var(raw)?;
        namespace.insert(name, value);
    }
    Ok(namespace)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wstl_location::{Namespace, NamespaceValue};

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("a=1").unwrap(), ("a".to_owned(), json!(1)));
        assert_eq!(
            parse_var(r#"obj={"k": "v"}"#).unwrap(),
            ("obj".to_owned(), json!({"k": "v"}))
        );
        assert_eq!(parse_var("name=alice").unwrap(), ("name".to_owned(), json!("alice")));
        assert_eq!(parse_var("eq=a=b").unwrap(), ("eq".to_owned(), json!("a=b")));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_load_namespace_file_then_overrides() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vars.json");
        fs::write(&path, r#"{"a": {"x": 1}, "b": "keep"}"#).unwrap();

        let ns = load_namespace(Some(&path), &["a=[1,2]".to_owned()]).unwrap();
        assert_eq!(ns.get("a"), Some(&NamespaceValue::Json(json!([1, 2]))));
        assert_eq!(ns.get("b"), Some(&NamespaceValue::Json(json!("keep"))));
    }

    #[test]
    fn test_load_namespace_rejects_non_object() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vars.json");
        fs::write(&path, "[1]").unwrap();
        let err = load_namespace(Some(&path), &[]).unwrap_err();
        assert!(err.to_string().contains("must hold a JSON object"), "got: {err}");
    }
}
