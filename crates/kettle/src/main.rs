use clap::Parser;
use kettle::cli::{Cli, render_options, run};
use kettle::config::ConfigRegistry;

fn main() -> anyhow::Result<()> {
    kettle::init_logging();
    let cli = Cli::parse();
    let app = run(&cli, ConfigRegistry::new())?;
    if cli.print {
        println!("{}", render_options(&app)?);
    } else {
        println!("{}", app.type_name);
    }
    Ok(())
}
