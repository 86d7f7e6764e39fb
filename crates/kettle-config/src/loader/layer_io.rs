//! IO helpers for reading config files and module manifests from disk.

use super::schema;
use crate::{ConfigError, ConfigFile};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read, validate, and decode a single config file.
pub(super) fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    debug!("loading config file (path={})", path.display());
    let mut value = read_json(path)?;
    schema::validate_config_file(&value, &path.display().to_string())?;
    if let Value::Object(map) = &mut value {
        map.retain(|_, entry| !entry.is_null());
    }
    Ok(serde_json::from_value(value)?)
}

/// Read and validate a module loader manifest.
pub(super) fn load_module_manifest(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    debug!("loading module manifest (path={})", path.display());
    let value = read_json(path)?;
    schema::validate_module_manifest(&value, &path.display().to_string())?;
    Ok(serde_json::from_value(value)?)
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    json5::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source,
    })
}
