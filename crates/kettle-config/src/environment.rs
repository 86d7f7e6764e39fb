//! Environment name selection for choosing the entry config file.

/// Process environment variable consulted when no override is given.
pub const KETTLE_ENV_VAR: &str = "KETTLE_ENV";
/// Environment used when neither an override nor the variable is set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Pick the environment name: explicit override, then `KETTLE_ENV`, then
/// `"development"`. Empty values count as unset.
pub fn select_environment_name(explicit_override: Option<&str>) -> String {
    let from_env = std::env::var(KETTLE_ENV_VAR).ok();
    environment_name_from(explicit_override, from_env.as_deref())
}

fn environment_name_from(explicit_override: Option<&str>, from_env: Option<&str>) -> String {
    [explicit_override, from_env]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(DEFAULT_ENVIRONMENT)
        .to_string()
}
