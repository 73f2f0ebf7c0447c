mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use remass_common::{default_config_path, init_logging, AppConfig, RemassResult};

use cli::Cli;

fn load_config(cli: &Cli) -> RemassResult<AppConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load(&path)?;
    log::debug!("Configuration loaded from '{}'", path.display());
    if let Some(dir) = &cli.dir {
        config.app_dir = dir.clone();
    }
    config.ensure_dirs()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(&cli).and_then(|config| commands::run(cli, config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("error: {}", e);
            if e.is_integrity() {
                ExitCode::from(3)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
