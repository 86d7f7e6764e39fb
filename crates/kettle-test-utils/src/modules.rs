use kettle_config::{ConfigError, ModuleLoader, ModuleScope};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One observed module load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCall {
    pub module: String,
    /// Registry size when the load started.
    pub registered_before: usize,
}

/// Module loader that records calls and can register definitions or fail
/// for selected modules.
#[derive(Clone, Default)]
pub struct RecordingModuleLoader {
    calls: Arc<Mutex<Vec<ModuleCall>>>,
    failing: HashSet<String>,
    definitions: HashMap<String, (String, Map<String, Value>)>,
}

impl RecordingModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `ModuleLoadFailed` when this module is loaded.
    pub fn with_failing(mut self, module: impl Into<String>) -> Self {
        self.failing.insert(module.into());
        self
    }

    /// Register `type_name` with `options` when this module is loaded.
    pub fn with_definition(
        mut self,
        module: impl Into<String>,
        type_name: impl Into<String>,
        options: Map<String, Value>,
    ) -> Self {
        self.definitions
            .insert(module.into(), (type_name.into(), options));
        self
    }

    pub fn calls(&self) -> Vec<ModuleCall> {
        self.calls.lock().clone()
    }

    pub fn modules(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|call| call.module.clone())
            .collect()
    }
}

impl ModuleLoader for RecordingModuleLoader {
    fn load_module(&self, module: &str, scope: &mut ModuleScope<'_>) -> Result<(), ConfigError> {
        self.calls.lock().push(ModuleCall {
            module: module.to_string(),
            registered_before: scope.registry().len(),
        });
        if self.failing.contains(module) {
            return Err(ConfigError::ModuleLoadFailed {
                module: module.to_string(),
                message: "module not installed".to_string(),
            });
        }
        if let Some((type_name, options)) = self.definitions.get(module) {
            scope.registry().register(type_name.clone(), options.clone());
        }
        Ok(())
    }
}
