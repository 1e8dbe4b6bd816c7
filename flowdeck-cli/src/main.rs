mod cli;
mod commands;
mod config;
mod paths;

use std::fs::File;
use std::process;

use anyhow::Context;
use clap::Parser;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::cli::Cli;
use crate::cli::Command;
use crate::config::ConfigFile;
use crate::config::Settings;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_level);

    if let Err(e) = run(cli).await {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = || -> anyhow::Result<Settings> {
        let path = cli
            .connection
            .config
            .clone()
            .or_else(paths::config_file)
            .context("cannot determine config directory; pass --config")?;
        let file = ConfigFile::load(&path)?;
        Ok(Settings::resolve(&cli.connection, file)?)
    };

    match &cli.command {
        Command::Flows => commands::flows::run(&settings()?).await,
        Command::Toggle { flow_id, status } => {
            commands::toggle::run(&settings()?, flow_id, *status).await
        }
        Command::CodeSettings(args) => commands::code_settings::run(args),
    }
}

/// Writes logs to a fresh `latest.log` in the cache directory.
///
/// Logging is best effort: when the file cannot be created the CLI runs
/// without it.
fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = File::create(&path) else {
        eprintln!("Warning: cannot write log file {}", path.display());
        return;
    };
    let _ = WriteLogger::init(level, Config::default(), file);
}
