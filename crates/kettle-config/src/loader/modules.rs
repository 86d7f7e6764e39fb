//! Module side-loading: loaders and where to find them.

use super::{MODULE_LOADER_FILE, ModuleScope, layer_io};
use crate::ConfigError;
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads named modules for their side effects, usually registering further
/// definitions through the scope of the resolution that requested them.
pub trait ModuleLoader: Send + Sync {
    fn load_module(&self, module: &str, scope: &mut ModuleScope<'_>) -> Result<(), ConfigError>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&str, &mut ModuleScope<'_>) -> Result<(), ConfigError> + Send + Sync,
{
    fn load_module(&self, module: &str, scope: &mut ModuleScope<'_>) -> Result<(), ConfigError> {
        self(module, scope)
    }
}

/// Finds the module loader serving a config directory, if any.
pub trait ModuleLoaderSource: Send + Sync {
    fn locate(&self, base_directory: &Path) -> Result<Option<Arc<dyn ModuleLoader>>, ConfigError>;
}

/// Looks for a `kettleModuleLoader.json` manifest in the config directory.
///
/// The manifest maps module names to config paths relative to the manifest.
/// Loading a module resolves its config through the composer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileModuleLoaderSource;

impl ModuleLoaderSource for FileModuleLoaderSource {
    fn locate(&self, base_directory: &Path) -> Result<Option<Arc<dyn ModuleLoader>>, ConfigError> {
        let manifest_path = base_directory.join(MODULE_LOADER_FILE);
        if !manifest_path.exists() {
            debug!("no module manifest (path={})", manifest_path.display());
            return Ok(None);
        }
        let entries = layer_io::load_module_manifest(&manifest_path)?;
        Ok(Some(Arc::new(ManifestModuleLoader {
            manifest_path,
            base_directory: base_directory.to_path_buf(),
            entries,
        })))
    }
}

/// Never finds a loader; listed modules are always skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModuleLoaderSource;

impl ModuleLoaderSource for NoModuleLoaderSource {
    fn locate(&self, _base_directory: &Path) -> Result<Option<Arc<dyn ModuleLoader>>, ConfigError> {
        Ok(None)
    }
}

/// Serves one injected loader for every config directory.
#[derive(Clone)]
pub struct StaticModuleLoaderSource {
    loader: Arc<dyn ModuleLoader>,
}

impl StaticModuleLoaderSource {
    pub fn new(loader: impl ModuleLoader + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    pub fn from_arc(loader: Arc<dyn ModuleLoader>) -> Self {
        Self { loader }
    }
}

impl ModuleLoaderSource for StaticModuleLoaderSource {
    fn locate(&self, _base_directory: &Path) -> Result<Option<Arc<dyn ModuleLoader>>, ConfigError> {
        Ok(Some(self.loader.clone()))
    }
}

struct ManifestModuleLoader {
    manifest_path: PathBuf,
    base_directory: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ModuleLoader for ManifestModuleLoader {
    fn load_module(&self, module: &str, scope: &mut ModuleScope<'_>) -> Result<(), ConfigError> {
        let config_path =
            self.entries
                .get(module)
                .ok_or_else(|| ConfigError::ModuleLoadFailed {
                    module: module.to_string(),
                    message: format!("not listed in {}", self.manifest_path.display()),
                })?;
        let type_name = scope.resolve(&self.base_directory, config_path)?;
        debug!("module loaded (module={module}, type_name={type_name})");
        Ok(())
    }
}
