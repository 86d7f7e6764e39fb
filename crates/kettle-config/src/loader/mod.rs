//! Recursive config composer.
//!
//! Resolves a config file, side-loads its modules, resolves its includes
//! depth-first, and registers the merged options under a type name.

mod layer_io;
mod modules;
mod schema;
mod utils;


pub use modules::{
    FileModuleLoaderSource, ModuleLoader, ModuleLoaderSource, NoModuleLoaderSource,
    StaticModuleLoaderSource,
};

use crate::{ConfigError, ConfigRegistry, RunningApplication};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Namespace for synthesized type names.
pub const DEFAULT_TYPE_NAME_PREFIX: &str = "kettle.config";
/// Module loader manifest looked up in each config directory.
pub const MODULE_LOADER_FILE: &str = "kettleModuleLoader.json";
/// Extension appended to environment names to find the entry config.
const DEFAULT_CONFIG_EXTENSION: &str = "json";

/// Options controlling composition.
#[derive(Debug, Clone)]
pub struct ComposerOptions {
    /// Prefix for synthesized type names.
    pub type_name_prefix: String,
    /// Fail with `CircularInclude` when an include re-enters its own chain.
    pub detect_cycles: bool,
    /// Extension of entry config files (`<env>.<ext>`).
    pub config_extension: String,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            type_name_prefix: DEFAULT_TYPE_NAME_PREFIX.to_string(),
            detect_cycles: true,
            config_extension: DEFAULT_CONFIG_EXTENSION.to_string(),
        }
    }
}

impl ComposerOptions {
    pub fn with_type_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_name_prefix = prefix.into();
        self
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    pub fn with_config_extension(mut self, extension: impl Into<String>) -> Self {
        self.config_extension = extension.into();
        self
    }
}

/// Composes config files into registry records.
pub struct ConfigComposer {
    registry: ConfigRegistry,
    module_source: Arc<dyn ModuleLoaderSource>,
    options: ComposerOptions,
    loaded_modules: Mutex<HashSet<(PathBuf, String)>>,
}

/// State of one `resolve` call: the include chain and the modules whose
/// load is in progress. Never shared between calls.
#[derive(Debug, Default)]
struct Resolution {
    chain: Vec<PathBuf>,
    loading_modules: Vec<(PathBuf, String)>,
}

/// Handed to module loaders so that configs they resolve join the include
/// chain of the resolution that requested the module.
pub struct ModuleScope<'a> {
    composer: &'a ConfigComposer,
    resolution: &'a mut Resolution,
}

impl ModuleScope<'_> {
    pub fn composer(&self) -> &ConfigComposer {
        self.composer
    }

    pub fn registry(&self) -> &ConfigRegistry {
        self.composer.registry()
    }

    /// Resolve a config file as part of the current resolution.
    pub fn resolve(
        &mut self,
        base_directory: impl AsRef<Path>,
        relative_file_path: impl AsRef<Path>,
    ) -> Result<String, ConfigError> {
        self.composer.resolve_file(
            base_directory.as_ref(),
            relative_file_path.as_ref(),
            self.resolution,
        )
    }
}

impl ConfigComposer {
    /// Create a composer writing into the registry, with modules found
    /// through `kettleModuleLoader.json` manifests.
    pub fn new(registry: ConfigRegistry) -> Self {
        Self {
            registry,
            module_source: Arc::new(FileModuleLoaderSource),
            options: ComposerOptions::default(),
            loaded_modules: Mutex::new(HashSet::new()),
        }
    }

    /// Replace how module loaders are located.
    pub fn with_module_source(mut self, source: impl ModuleLoaderSource + 'static) -> Self {
        self.module_source = Arc::new(source);
        self
    }

    pub fn with_options(mut self, options: ComposerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Resolve a config file and everything it includes, returning the type
    /// name its merged options were registered under.
    ///
    /// Includes and modules resolve relative to the file's own directory.
    /// Nothing is registered for a file that fails; includes registered
    /// before the failure stay registered.
    pub fn resolve(
        &self,
        base_directory: impl AsRef<Path>,
        relative_file_path: impl AsRef<Path>,
    ) -> Result<String, ConfigError> {
        let base_directory = base_directory.as_ref();
        let relative_file_path = relative_file_path.as_ref();
        info!(
            "resolving config (base={}, file={})",
            base_directory.display(),
            relative_file_path.display()
        );
        self.resolve_file(
            base_directory,
            relative_file_path,
            &mut Resolution::default(),
        )
    }

    /// Resolve `<environment>.json` in the directory and instantiate the
    /// resulting application.
    pub fn resolve_and_instantiate(
        &self,
        base_directory: impl AsRef<Path>,
        environment_name: &str,
    ) -> Result<RunningApplication, ConfigError> {
        let file_name = self.config_file_name(environment_name);
        let type_name = self.resolve(base_directory, &file_name)?;
        info!("instantiating application (type_name={type_name})");
        self.registry.instantiate(&type_name)
    }

    /// Entry config file name for an environment.
    pub fn config_file_name(&self, environment_name: &str) -> String {
        format!("{environment_name}.{}", self.options.config_extension)
    }

    fn resolve_file(
        &self,
        base_directory: &Path,
        relative_file_path: &Path,
        resolution: &mut Resolution,
    ) -> Result<String, ConfigError> {
        let location = utils::locate_config(base_directory, relative_file_path);
        if self.options.detect_cycles && resolution.chain.contains(&location.identity) {
            let mut chain = resolution.chain.clone();
            chain.push(location.identity);
            return Err(ConfigError::CircularInclude { chain });
        }
        resolution.chain.push(location.identity.clone());
        let result = self.compose_file(&location, resolution);
        resolution.chain.pop();
        result
    }

    fn compose_file(
        &self,
        location: &utils::ConfigLocation,
        resolution: &mut Resolution,
    ) -> Result<String, ConfigError> {
        let full_path = &location.full_path;
        let mut config = layer_io::load_config_file(full_path)?;
        self.load_modules(&config.modules, &location.effective_base, resolution)?;

        let mut included_type_names = Vec::with_capacity(config.includes.len());
        for include in &config.includes {
            debug!(
                "resolving include (from={}, include={include})",
                full_path.display()
            );
            included_type_names.push(self.resolve_file(
                &location.effective_base,
                Path::new(include),
                resolution,
            )?);
        }

        let type_name = match config.type_name.take() {
            Some(name) if !name.is_empty() => name,
            _ => self.synthesize_type_name(),
        };
        let options = config.into_options(included_type_names);
        self.registry.register(type_name.clone(), options);
        debug!(
            "composed config (path={}, type_name={type_name})",
            full_path.display()
        );
        Ok(type_name)
    }

    /// Load each listed module once. A module is remembered only after it
    /// loads successfully; re-entering a module still loading in the same
    /// resolution is skipped.
    fn load_modules(
        &self,
        modules: &[String],
        base_directory: &Path,
        resolution: &mut Resolution,
    ) -> Result<(), ConfigError> {
        if modules.is_empty() {
            return Ok(());
        }
        let Some(loader) = self.module_source.locate(base_directory)? else {
            warn!(
                "no module loader found for {} (modules={:?}); skipping",
                base_directory.display(),
                modules
            );
            return Ok(());
        };
        for module in modules {
            let key = (base_directory.to_path_buf(), module.clone());
            if self.loaded_modules.lock().contains(&key) {
                debug!("module already loaded (module={module})");
                continue;
            }
            if resolution.loading_modules.contains(&key) {
                debug!("module load in progress (module={module})");
                continue;
            }
            debug!(
                "loading module (module={module}, base={})",
                base_directory.display()
            );
            resolution.loading_modules.push(key.clone());
            let result = loader.load_module(
                module,
                &mut ModuleScope {
                    composer: self,
                    resolution: &mut *resolution,
                },
            );
            resolution.loading_modules.pop();
            result?;
            self.loaded_modules.lock().insert(key);
        }
        Ok(())
    }

    fn synthesize_type_name(&self) -> String {
        format!(
            "{}.{}",
            self.options.type_name_prefix,
            Uuid::new_v4().simple()
        )
    }
}

impl std::fmt::Debug for ConfigComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigComposer")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}
