//! Registry of composed config records and their construction logic.

use crate::ConfigError;
use crate::merge::merge_options;
use crate::model::{GRADE_NAMES_KEY, grade_names_of};
use log::debug;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Application handle produced by instantiating a registered config.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningApplication {
    /// Type name the application was built from.
    pub type_name: String,
    /// Linearized grades contributing to the effective options.
    pub grade_names: Vec<String>,
    /// Options after merging every registered grade.
    pub options: Map<String, Value>,
}

impl RunningApplication {
    /// Look up a top-level option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// Construction logic registered under a type name.
pub trait ComponentFactory: Send + Sync {
    fn create(
        &self,
        registry: &ConfigRegistry,
        type_name: &str,
    ) -> Result<RunningApplication, ConfigError>;
}

impl<F> ComponentFactory for F
where
    F: Fn(&ConfigRegistry, &str) -> Result<RunningApplication, ConfigError> + Send + Sync,
{
    fn create(
        &self,
        registry: &ConfigRegistry,
        type_name: &str,
    ) -> Result<RunningApplication, ConfigError> {
        self(registry, type_name)
    }
}

/// Factory installed alongside every registered record: builds the
/// application from the record's effective options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsFactory;

impl ComponentFactory for DefaultsFactory {
    fn create(
        &self,
        registry: &ConfigRegistry,
        type_name: &str,
    ) -> Result<RunningApplication, ConfigError> {
        let options = registry.effective_options(type_name)?;
        Ok(RunningApplication {
            type_name: type_name.to_string(),
            grade_names: grade_names_of(&options),
            options,
        })
    }
}

/// Shared table of type name to registered options.
///
/// Clones share the same state. Re-registering a type name replaces the
/// previous options.
#[derive(Clone, Default)]
pub struct ConfigRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

#[derive(Default)]
struct RegistryState {
    defaults: HashMap<String, Map<String, Value>>,
    order: Vec<String>,
    factories: HashMap<String, Arc<dyn ComponentFactory>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register options under a type name and install default construction
    /// logic for it unless a factory is already present.
    pub fn register(&self, type_name: impl Into<String>, options: Map<String, Value>) {
        let type_name = type_name.into();
        let mut state = self.inner.write();
        if state.defaults.insert(type_name.clone(), options).is_some() {
            debug!("replacing registered config (type_name={type_name})");
        } else {
            debug!("registered config (type_name={type_name})");
        }
        state
            .factories
            .entry(type_name.clone())
            .or_insert_with(|| Arc::new(DefaultsFactory));
        state.order.push(type_name);
    }

    /// Install custom construction logic for a type name.
    pub fn register_factory(
        &self,
        type_name: impl Into<String>,
        factory: impl ComponentFactory + 'static,
    ) {
        let type_name = type_name.into();
        debug!("registered factory (type_name={type_name})");
        self.inner
            .write()
            .factories
            .insert(type_name, Arc::new(factory));
    }

    /// Fetch the registered options for a type name.
    pub fn get(&self, type_name: &str) -> Option<Map<String, Value>> {
        self.inner.read().defaults.get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.inner.read().defaults.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().defaults.keys().cloned().collect();
        names.sort();
        names
    }

    /// Type names in the order they were registered, one entry per write.
    pub fn registration_order(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().defaults.is_empty()
    }

    /// Drop every record and factory.
    pub fn clear(&self) {
        let mut state = self.inner.write();
        state.defaults.clear();
        state.order.clear();
        state.factories.clear();
    }

    /// Invoke the construction logic registered for a type name.
    pub fn instantiate(&self, type_name: &str) -> Result<RunningApplication, ConfigError> {
        let factory = self
            .inner
            .read()
            .factories
            .get(type_name)
            .cloned()
            .ok_or_else(|| ConfigError::UnregisteredConfig(type_name.to_string()))?;
        factory.create(self, type_name)
    }

    /// Options for a type name after merging its registered grades.
    ///
    /// Grades are walked depth-first; each registered grade contributes its
    /// own grades first, then its options, and the record's options land
    /// last. Unregistered grade names are kept as labels only.
    pub fn effective_options(&self, type_name: &str) -> Result<Map<String, Value>, ConfigError> {
        let state = self.inner.read();
        let own = state
            .defaults
            .get(type_name)
            .ok_or_else(|| ConfigError::UnregisteredConfig(type_name.to_string()))?;

        let mut visited = HashSet::from([type_name.to_string()]);
        let mut linearized = Vec::new();
        let mut merged = Map::new();
        state.apply_grades(own, &mut visited, &mut linearized, &mut merged);
        merge_options(&mut merged, own);
        merged.insert(
            GRADE_NAMES_KEY.to_string(),
            Value::Array(linearized.into_iter().map(Value::String).collect()),
        );
        Ok(merged)
    }
}

impl RegistryState {
    fn apply_grades(
        &self,
        options: &Map<String, Value>,
        visited: &mut HashSet<String>,
        linearized: &mut Vec<String>,
        merged: &mut Map<String, Value>,
    ) {
        for grade in grade_names_of(options) {
            if !visited.insert(grade.clone()) {
                continue;
            }
            linearized.push(grade.clone());
            if let Some(grade_options) = self.defaults.get(&grade) {
                self.apply_grades(grade_options, visited, linearized, merged);
                merge_options(merged, grade_options);
            }
        }
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("type_names", &self.type_names())
            .finish()
    }
}
