//! Config file model for Kettle JSON configs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options key holding the ordered grade list.
pub const GRADE_NAMES_KEY: &str = "gradeNames";

/// One JSON config document, before includes are resolved.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Explicit registry name; synthesized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Arbitrary options registered under the type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Config paths merged in before this file, relative to its directory.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Modules side-loaded before includes are processed.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl ConfigFile {
    /// Declared grade names, normalized to a sequence.
    ///
    /// A lone string becomes a one-element list; absent or null is empty.
    pub fn grade_names(&self) -> Vec<String> {
        self.options
            .as_ref()
            .map(grade_names_of)
            .unwrap_or_default()
    }

    /// Build the registered options: declared options with the included type
    /// names appended to the declared grades, in order.
    pub fn into_options(self, included_type_names: Vec<String>) -> Map<String, Value> {
        let mut grade_names = self.grade_names();
        grade_names.extend(included_type_names);
        let mut options = self.options.unwrap_or_default();
        options.insert(
            GRADE_NAMES_KEY.to_string(),
            Value::Array(grade_names.into_iter().map(Value::String).collect()),
        );
        options
    }
}

/// Read the grade list stored in registered options.
pub(crate) fn grade_names_of(options: &Map<String, Value>) -> Vec<String> {
    match options.get(GRADE_NAMES_KEY) {
        Some(Value::String(name)) => vec![name.clone()],
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(|name| name.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_from(value: Value) -> ConfigFile {
        serde_json::from_value(value).expect("config")
    }

    #[test]
    fn lone_grade_name_is_wrapped() {
        let config = config_from(json!({ "options": { "gradeNames": "app.only" } }));
        assert_eq!(config.grade_names(), vec!["app.only".to_string()]);
    }

    #[test]
    fn included_names_follow_declared_grades() {
        let config = config_from(json!({
            "options": { "gradeNames": ["g1", "g2"], "port": 8081 }
        }));
        let options = config.into_options(vec!["X".to_string()]);
        assert_eq!(
            Value::Object(options),
            json!({ "gradeNames": ["g1", "g2", "X"], "port": 8081 })
        );
    }

    #[test]
    fn missing_options_become_empty_grades() {
        let options = ConfigFile::default().into_options(Vec::new());
        assert_eq!(Value::Object(options), json!({ "gradeNames": [] }));
    }

    #[test]
    fn duplicate_grades_are_kept() {
        let config = config_from(json!({ "options": { "gradeNames": ["X"] } }));
        let options = config.into_options(vec!["X".to_string()]);
        assert_eq!(grade_names_of(&options), vec!["X".to_string(), "X".to_string()]);
    }
}
