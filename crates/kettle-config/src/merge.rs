//! Deep merge of registered options along a grade chain.

use crate::model::GRADE_NAMES_KEY;
use serde_json::{Map, Value};

/// Merge overlay options into the base. Nested objects merge key by key,
/// anything else is replaced. The grade list is left to the caller.
pub(crate) fn merge_options(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if key == GRADE_NAMES_KEY {
            continue;
        }
        match base.get_mut(key) {
            Some(existing) => merge_values(existing, value),
            None => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}
