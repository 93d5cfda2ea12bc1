//! Deep merge of the `default` section with the active environment section.

use serde_json::Value;

/// Merge `overlay` into `base`, recursing only where both sides are mappings.
///
/// Scalars, sequences and type mismatches are replaced wholesale by the
/// overlay value. Keys present only in `base` are kept.
pub(super) fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value;
        }
    }
}

/// Merge two sections into a new document; `None` sections count as empty.
pub(super) fn merge_sections(defaults: Option<Value>, environment: Option<Value>) -> Value {
    let mut merged = defaults.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    if let Some(environment) = environment {
        deep_merge(&mut merged, environment);
    }
    merged
}
