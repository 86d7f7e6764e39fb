//! Error types for config composition and instantiation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while composing, registering, or instantiating configs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed (missing or unreadable).
    #[error("failed to read config {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Parsing a config file failed.
    #[error("failed to parse config {}: {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A specific field has the wrong shape.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A listed module could not be loaded.
    #[error("failed to load module {module}: {message}")]
    ModuleLoadFailed { module: String, message: String },
    /// An include chain re-entered a file that is still being resolved.
    #[error("circular include: {}", format_chain(.chain))]
    CircularInclude { chain: Vec<PathBuf> },
    /// No construction logic or record exists under the type name.
    #[error("no config registered under type name {0}")]
    UnregisteredConfig(String),
}

impl ConfigError {
    /// True for failures caused by a missing, unparsable, or mis-shaped file.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ConfigError::ReadFailed { .. }
                | ConfigError::ParseFailed { .. }
                | ConfigError::DecodeFailed(_)
                | ConfigError::InvalidField { .. }
        )
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
