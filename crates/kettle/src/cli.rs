//! Command-line bootstrap: pick an environment, compose its config, and
//! instantiate the application.

use anyhow::Context;
use clap::Parser;
use kettle_config::{ConfigComposer, ConfigRegistry, RunningApplication, select_environment_name};
use log::info;
use std::path::PathBuf;

/// Command-line options for the Kettle bootstrap.
#[derive(Debug, Parser)]
#[command(name = "kettle", version, about = "Compose and start a Kettle config")]
pub struct Cli {
    /// Directory holding the environment config files
    #[arg(value_name = "CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
    /// Environment name; falls back to KETTLE_ENV, then "development"
    #[arg(long = "env", value_name = "NAME")]
    pub environment: Option<String>,
    /// Print the effective options of the application as JSON
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    /// Config directory, defaulting to the current directory.
    pub fn config_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("failed to read current directory"),
        }
    }

    pub fn environment_name(&self) -> String {
        select_environment_name(self.environment.as_deref())
    }
}

/// Compose the selected environment into `registry` and instantiate it.
pub fn run(cli: &Cli, registry: ConfigRegistry) -> anyhow::Result<RunningApplication> {
    let config_dir = cli.config_dir()?;
    let environment = cli.environment_name();
    info!(
        "starting kettle (config_dir={}, environment={environment})",
        config_dir.display()
    );
    let composer = ConfigComposer::new(registry);
    let app = composer
        .resolve_and_instantiate(&config_dir, &environment)
        .with_context(|| {
            format!(
                "failed to load config {} from {}",
                composer.config_file_name(&environment),
                config_dir.display()
            )
        })?;
    info!("application ready (type_name={})", app.type_name);
    Ok(app)
}

/// Render the effective options for `--print`.
pub fn render_options(app: &RunningApplication) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&app.options).context("failed to render options")
}
