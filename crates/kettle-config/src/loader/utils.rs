//! Helper utilities for config path handling.

use std::path::{Component, Path, PathBuf};

/// Where a config file lives and how it is identified while resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ConfigLocation {
    /// Full path, normalized lexically (symlinks are not followed).
    pub(super) full_path: PathBuf,
    /// Directory the file's own includes and modules resolve against.
    pub(super) effective_base: PathBuf,
    /// Canonical path when the file exists; identifies it in include chains.
    pub(super) identity: PathBuf,
}

/// Locate a config file relative to a base directory.
///
/// The effective base is `base_directory` joined with the directory prefix
/// of `relative_file_path`, so a symlinked file still resolves its includes
/// next to the link.
pub(super) fn locate_config(base_directory: &Path, relative_file_path: &Path) -> ConfigLocation {
    let full_path = normalize_lexically(&base_directory.join(relative_file_path));
    let effective_base = full_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_directory.to_path_buf());
    let identity = full_path
        .canonicalize()
        .unwrap_or_else(|_| full_path.clone());
    ConfigLocation {
        full_path,
        effective_base,
        identity,
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
