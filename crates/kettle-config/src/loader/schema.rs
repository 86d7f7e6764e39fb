//! Shape validation for Kettle config files and module manifests.

use crate::ConfigError;
use crate::model::GRADE_NAMES_KEY;
use log::debug;
use serde_json::{Map, Value};

/// Top-level keys the composer reads; anything else is ignored.
const KNOWN_KEYS: &[&str] = &["$schema", "typeName", "options", "includes", "modules"];

/// Validate a parsed config file before decoding it.
///
/// Every known key may be null, which reads as absent. Unknown keys are
/// left alone.
pub(super) fn validate_config_file(value: &Value, label: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, label, "")?;
    for key in map.keys().filter(|key| !KNOWN_KEYS.contains(&key.as_str())) {
        debug!("ignoring unknown config key (config={label}, key={key})");
    }

    if let Some(value) = present(map, "$schema") {
        expect_string(value, label, "$schema")?;
    }
    if let Some(value) = present(map, "typeName") {
        expect_string(value, label, "typeName")?;
    }
    if let Some(value) = present(map, "options") {
        validate_options(value, label, "options")?;
    }
    if let Some(value) = present(map, "includes") {
        validate_string_array(value, label, "includes")?;
    }
    if let Some(value) = present(map, "modules") {
        validate_string_array(value, label, "modules")?;
    }

    Ok(())
}

/// Validate a module loader manifest: module name to config path.
pub(super) fn validate_module_manifest(value: &Value, label: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, label, "")?;
    for (module, path) in map {
        expect_string(path, label, module)?;
    }
    Ok(())
}

/// Validate the "options" block. Only the grade list has a fixed shape.
fn validate_options(value: &Value, label: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, label, path)?;
    match present(map, GRADE_NAMES_KEY) {
        None | Some(Value::String(_)) => Ok(()),
        Some(value) => validate_string_array(value, label, &join_path(path, GRADE_NAMES_KEY)),
    }
}

/// Fetch a key, treating null as absent.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    label: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(label, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, label: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(label, path, "expected string"))
    }
}

/// Validate that a value is an array of strings.
fn validate_string_array(value: &Value, label: &str, path: &str) -> Result<(), ConfigError> {
    let arr = match value {
        Value::Array(arr) => arr,
        _ => return Err(invalid_field(label, path, "expected array")),
    };
    for (idx, entry) in arr.iter().enumerate() {
        if entry.as_str().is_none() {
            return Err(invalid_field(
                label,
                &format!("{path}[{idx}]"),
                "expected string",
            ));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(label: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{label}:{normalized_path}"),
        message: message.to_string(),
    }
}
