//! The `raw` / `data.raw` mirror.
//!
//! Older callers read the downstream payload from `raw`, newer ones from
//! `data.raw`. Every response goes through [`mirror_raw`] right before it
//! is serialized so both paths resolve whenever either does.

use serde_json::{Map, Value};

/// Copy whichever of `raw` / `data.raw` is present into the missing slot.
///
/// Null counts as absent. When both are present nothing changes, and
/// when neither is, nothing is invented. A non-object `data` is replaced
/// by `{raw}` when `raw` needs mirroring into it.
pub fn mirror_raw(body: &mut Value) {
    let Some(obj) = body.as_object_mut() else {
        return;
    };

    let top = obj.get("raw").filter(|v| !v.is_null()).cloned();
    let nested = obj
        .get("data")
        .and_then(|d| d.get("raw"))
        .filter(|v| !v.is_null())
        .cloned();

    match (top, nested) {
        (Some(raw), None) => {
            if !matches!(obj.get("data"), Some(Value::Object(_))) {
                obj.insert("data".to_string(), Value::Object(Map::new()));
            }
            if let Some(Value::Object(data)) = obj.get_mut("data") {
                data.insert("raw".to_string(), raw);
            }
        }
        (None, Some(raw)) => {
            obj.insert("raw".to_string(), raw);
        }
        _ => {}
    }
}
