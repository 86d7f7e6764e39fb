//! Kettle config composition.
//!
//! Turns a directory of JSON config files into registered, merged config
//! records: includes are resolved recursively, modules are side-loaded, and
//! every record can be instantiated into a running application definition.

mod environment;
mod error;
mod loader;
mod merge;
mod model;
mod registry;

/// Environment name selection.
pub use environment::{DEFAULT_ENVIRONMENT, KETTLE_ENV_VAR, select_environment_name};
/// Public error type returned by composition and instantiation.
pub use error::ConfigError;
/// Composer, its options, and module loading seams.
pub use loader::{
    ComposerOptions, ConfigComposer, DEFAULT_TYPE_NAME_PREFIX, FileModuleLoaderSource,
    MODULE_LOADER_FILE, ModuleLoader, ModuleLoaderSource, ModuleScope, NoModuleLoaderSource,
    StaticModuleLoaderSource,
};
/// Config file model.
pub use model::{ConfigFile, GRADE_NAMES_KEY};
/// Registry of composed records.
pub use registry::{ComponentFactory, ConfigRegistry, DefaultsFactory, RunningApplication};
