mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};
use paths::AppPaths;
use run::DemoKind;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Tube(args) => run::run(DemoKind::Tube, args),
        Command::Orbit(args) => run::run(DemoKind::Orbit, args),
        Command::Config(config_cmd) => handle_config_command(config_cmd.action),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    let paths = AppPaths::discover()?;
    match action {
        ConfigAction::Where => run_config_where(&paths),
    }
}

fn run_config_where(paths: &AppPaths) -> Result<()> {
    let file = paths.config_file();
    println!("Configuration:");
    println!("  dir:    {}", paths.config_dir().display());
    println!(
        "  file:   {} ({})",
        file.display(),
        if file.exists() { "present" } else { "missing" }
    );
    Ok(())
}
