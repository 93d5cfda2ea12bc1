//! YAML parsing into the string-keyed document used by the merge stage.

use crate::ConfigError;
use serde_json::{Map, Number, Value};
use serde_yaml::value::TaggedValue;

/// Tags accepted in config files; each resolves to its scalar's text.
const ALLOWED_TAGS: &[&str] = &["symbol", "ruby/symbol"];

/// Parse expanded config text into a top-level mapping.
///
/// Empty input (or a document holding only comments or `null`) yields an
/// empty mapping.
pub(super) fn parse(text: &str) -> Result<Map<String, Value>, ConfigError> {
    let blank = text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(Map::new());
    }

    let mut raw: serde_yaml::Value = serde_yaml::from_str(text)?;
    raw.apply_merge()?;

    match convert(raw, "")? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(invalid_document("", "expected a mapping at the top level")),
    }
}

/// Convert a YAML value, resolving allowed tags and rejecting the rest.
fn convert(value: serde_yaml::Value, path: &str) -> Result<Value, ConfigError> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(flag) => Ok(Value::Bool(flag)),
        serde_yaml::Value::Number(number) => convert_number(&number, path),
        serde_yaml::Value::String(text) => Ok(Value::String(text)),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| convert(item, &format!("{path}[{idx}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = convert_key(key, path)?;
                let child_path = join_path(path, &key);
                map.insert(key, convert(value, &child_path)?);
            }
            Ok(Value::Object(map))
        }
        serde_yaml::Value::Tagged(tagged) => resolve_tag(*tagged, path).map(Value::String),
    }
}

/// Text of an allow-listed tagged scalar.
fn resolve_tag(tagged: TaggedValue, path: &str) -> Result<String, ConfigError> {
    let tag = tagged.tag.to_string();
    if !ALLOWED_TAGS.contains(&tag.trim_start_matches('!')) {
        return Err(ConfigError::DisallowedTag {
            tag,
            path: normalize_path(path),
        });
    }
    scalar_text(&tagged.value)
        .ok_or_else(|| invalid_document(path, &format!("`{tag}` requires a scalar value")))
}

fn convert_key(key: serde_yaml::Value, path: &str) -> Result<String, ConfigError> {
    match key {
        serde_yaml::Value::Tagged(tagged) => resolve_tag(*tagged, path),
        serde_yaml::Value::Null => Err(invalid_document(path, "mapping keys must not be null")),
        other => scalar_text(&other)
            .ok_or_else(|| invalid_document(path, "mapping keys must be scalars")),
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(text) => Some(text.clone()),
        serde_yaml::Value::Number(number) => Some(number.to_string()),
        serde_yaml::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn convert_number(number: &serde_yaml::Number, path: &str) -> Result<Value, ConfigError> {
    if let Some(value) = number.as_i64() {
        return Ok(Value::from(value));
    }
    if let Some(value) = number.as_u64() {
        return Ok(Value::from(value));
    }
    number
        .as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| invalid_document(path, "numbers must be finite"))
}

/// Join nested paths for better error messages.
pub(super) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        path.to_string()
    }
}

pub(super) fn invalid_document(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidDocument {
        path: normalize_path(path),
        message: message.to_string(),
    }
}
