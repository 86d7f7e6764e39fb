//! Module side-loading during config composition.

use kettle_config::{
    ConfigComposer, ConfigError, ConfigRegistry, FileModuleLoaderSource, MODULE_LOADER_FILE,
    ModuleScope, StaticModuleLoaderSource,
};
use kettle_test_utils::{ConfigDir, ModuleCall, RecordingModuleLoader};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn composer_with(loader: &RecordingModuleLoader) -> ConfigComposer {
    ConfigComposer::new(ConfigRegistry::new())
        .with_module_source(StaticModuleLoaderSource::new(loader.clone()))
}

/// Modules load in listed order, before any include is registered.
#[test]
fn modules_load_in_order_before_includes() {
    let dir = ConfigDir::new()
        .with_file(
            "app.json",
            r#"{ "typeName": "app", "modules": ["first", "second"], "includes": ["base.json"] }"#,
        )
        .with_file("base.json", r#"{ "typeName": "base" }"#);
    let loader = RecordingModuleLoader::new();
    let composer = composer_with(&loader);

    composer.resolve(dir.path(), "app.json").expect("resolve");

    assert_eq!(
        loader.calls(),
        vec![
            ModuleCall {
                module: "first".to_string(),
                registered_before: 0,
            },
            ModuleCall {
                module: "second".to_string(),
                registered_before: 0,
            },
        ]
    );
    assert_eq!(
        composer.registry().registration_order(),
        vec!["base".to_string(), "app".to_string()]
    );
}

#[test]
fn module_definitions_are_registered() {
    let dir = ConfigDir::new().with_file(
        "app.json",
        r#"{ "typeName": "app", "modules": ["kettle-sessions"], "options": { "gradeNames": ["kettle.sessions"] } }"#,
    );
    let mut options = Map::new();
    options.insert("cookieName".to_string(), json!("kettle.sid"));
    let loader =
        RecordingModuleLoader::new().with_definition("kettle-sessions", "kettle.sessions", options);
    let composer = composer_with(&loader);

    composer.resolve(dir.path(), "app.json").expect("resolve");
    let app = composer.registry().instantiate("app").expect("app");

    assert_eq!(app.option("cookieName"), Some(&json!("kettle.sid")));
    assert_eq!(app.grade_names, vec!["kettle.sessions".to_string()]);
}

#[test]
fn failing_module_aborts_resolution() {
    let dir = ConfigDir::new().with_file(
        "app.json",
        r#"{ "typeName": "app", "modules": ["present", "absent", "never"] }"#,
    );
    let loader = RecordingModuleLoader::new().with_failing("absent");
    let composer = composer_with(&loader);

    let err = composer.resolve(dir.path(), "app.json").unwrap_err();

    assert!(matches!(err, ConfigError::ModuleLoadFailed { ref module, .. } if module == "absent"));
    assert!(!err.is_malformed());
    assert_eq!(loader.modules(), vec!["present".to_string(), "absent".to_string()]);
    assert!(composer.registry().is_empty());
}

/// A failed module is not remembered: every resolution retries and fails.
#[test]
fn failed_module_is_retried_on_next_resolve() {
    let dir = ConfigDir::new().with_file("app.json", r#"{ "typeName": "app", "modules": ["flaky"] }"#);
    let loader = RecordingModuleLoader::new().with_failing("flaky");
    let composer = composer_with(&loader);

    let first = composer.resolve(dir.path(), "app.json").unwrap_err();
    let second = composer.resolve(dir.path(), "app.json").unwrap_err();

    assert!(matches!(first, ConfigError::ModuleLoadFailed { .. }));
    assert!(matches!(second, ConfigError::ModuleLoadFailed { .. }));
    assert_eq!(loader.modules(), vec!["flaky".to_string(), "flaky".to_string()]);
    assert!(!composer.registry().contains("app"));
}

/// A module that resolves a config listing the same module does not load
/// itself again.
#[test]
fn module_reentering_itself_is_skipped() {
    let dir = ConfigDir::new()
        .with_file("app.json", r#"{ "typeName": "app", "modules": ["io"] }"#)
        .with_file(MODULE_LOADER_FILE, r#"{ "io": "io.json" }"#)
        .with_file("io.json", r#"{ "typeName": "kettle.io", "modules": ["io"] }"#);
    let composer = ConfigComposer::new(ConfigRegistry::new());

    composer.resolve(dir.path(), "app.json").expect("resolve");

    assert_eq!(
        composer.registry().registration_order(),
        vec!["kettle.io".to_string(), "app".to_string()]
    );
}

/// A module listed by several files is loaded once per directory.
#[test]
fn repeated_module_loads_once() {
    let dir = ConfigDir::new()
        .with_file(
            "app.json",
            r#"{ "typeName": "app", "modules": ["shared"], "includes": ["base.json"] }"#,
        )
        .with_file("base.json", r#"{ "typeName": "base", "modules": ["shared", "extra"] }"#);
    let loader = RecordingModuleLoader::new();
    let composer = composer_with(&loader);

    composer.resolve(dir.path(), "app.json").expect("resolve");

    assert_eq!(loader.modules(), vec!["shared".to_string(), "extra".to_string()]);
}

#[test]
fn manifest_loader_resolves_module_configs() {
    let dir = ConfigDir::new()
        .with_file(
            "app.json",
            r#"{ "typeName": "app", "modules": ["kettle-io"], "options": { "gradeNames": ["kettle.server.io"] } }"#,
        )
        .with_file(
            MODULE_LOADER_FILE,
            r#"{ "kettle-io": "modules/io/config.json" }"#,
        )
        .with_file(
            "modules/io/config.json",
            r#"{ "typeName": "kettle.server.io", "options": { "ioOptions": { "logLevel": 4 } }, "includes": ["requests.json"] }"#,
        )
        .with_file(
            "modules/io/requests.json",
            r#"{ "typeName": "kettle.requests.io" }"#,
        );
    let composer =
        ConfigComposer::new(ConfigRegistry::new()).with_module_source(FileModuleLoaderSource);

    composer.resolve(dir.path(), "app.json").expect("resolve");

    assert_eq!(
        composer.registry().registration_order(),
        vec![
            "kettle.requests.io".to_string(),
            "kettle.server.io".to_string(),
            "app".to_string()
        ]
    );
    let effective = composer.registry().effective_options("app").expect("effective");
    assert_eq!(
        Value::Object(effective),
        json!({
            "gradeNames": ["kettle.server.io", "kettle.requests.io"],
            "ioOptions": { "logLevel": 4 }
        })
    );
}

#[test]
fn manifest_without_module_entry_is_fatal() {
    let dir = ConfigDir::new()
        .with_file("app.json", r#"{ "typeName": "app", "modules": ["unknown"] }"#)
        .with_file(MODULE_LOADER_FILE, r#"{ "known": "known.json" }"#);
    let composer = ConfigComposer::new(ConfigRegistry::new());

    let err = composer.resolve(dir.path(), "app.json").unwrap_err();

    assert!(matches!(err, ConfigError::ModuleLoadFailed { ref module, .. } if module == "unknown"));
    assert!(!composer.registry().contains("app"));
}

#[test]
fn malformed_manifest_is_reported() {
    let dir = ConfigDir::new()
        .with_file("app.json", r#"{ "typeName": "app", "modules": ["io"] }"#)
        .with_file(MODULE_LOADER_FILE, r#"{ "io": 42 }"#);
    let composer = ConfigComposer::new(ConfigRegistry::new());

    let err = composer.resolve(dir.path(), "app.json").unwrap_err();

    assert!(err.is_malformed());
    assert!(format!("{err}").contains("expected string"));
}

#[test]
fn closure_loaders_can_be_injected() {
    let dir = ConfigDir::new().with_file("app.json", r#"{ "typeName": "app", "modules": ["m"] }"#);
    let composer = ConfigComposer::new(ConfigRegistry::new()).with_module_source(
        StaticModuleLoaderSource::new(
            |module: &str, scope: &mut ModuleScope<'_>| -> Result<(), ConfigError> {
                scope
                    .registry()
                    .register(format!("module.{module}"), Map::new());
                Ok(())
            },
        ),
    );

    composer.resolve(dir.path(), "app.json").expect("resolve");

    assert!(composer.registry().contains("module.m"));
}
