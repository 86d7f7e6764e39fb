use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary config directory that is removed on drop.
pub struct ConfigDir {
    temp: TempDir,
}

impl ConfigDir {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write a file relative to the directory, creating parents as needed.
    pub fn write(&self, relative: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create config dir");
        }
        fs::write(&path, contents).expect("write config");
        path
    }

    /// Builder-style variant of [`ConfigDir::write`].
    pub fn with_file(self, relative: impl AsRef<Path>, contents: &str) -> Self {
        self.write(relative, contents);
        self
    }
}

impl Default for ConfigDir {
    fn default() -> Self {
        Self::new()
    }
}
