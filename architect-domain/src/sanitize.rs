use serde_json::{Map, Value};

/// Keys whose explicit `null` is meaningful and must survive stripping.
pub const ALLOWED_NULLS: &[&str] = &["maxLevels"];

/// Remove `null` values from a fragment, recursing into nested mappings and
/// lists. Keys listed in [`ALLOWED_NULLS`] keep their nulls.
pub fn strip_nulls(map: &mut Map<String, Value>) {
    map.retain(|key, value| !value.is_null() || ALLOWED_NULLS.contains(&key.as_str()));
    for value in map.values_mut() {
        strip_value(value);
    }
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Object(map) => strip_nulls(map),
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_value);
        }
        _ => {}
    }
}
