//! Command-line interface definition.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

use flowdeck_lib::model::FlowStatus;

#[derive(Debug, Parser)]
#[command(name = "flowdeck")]
#[command(about = "Browse flows page by page and edit code steps")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub connection: Connection,

    /// Log level written to the log file.
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    pub log_level: log::LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection flags shared by every command.
#[derive(Debug, Clone, Args)]
pub struct Connection {
    /// API base URL.
    #[arg(long, env = "FLOWDECK_URL", global = true)]
    pub url: Option<String>,

    /// Bearer token.
    #[arg(long, env = "FLOWDECK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Project whose flows are listed.
    #[arg(long, env = "FLOWDECK_PROJECT_ID", global = true)]
    pub project: Option<String>,

    /// Rows per page.
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Config file, defaults to `config.json` in the platform config directory.
    #[arg(long, env = "FLOWDECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Page through the flows of a project interactively.
    Flows,

    /// Enable or disable a flow.
    Toggle {
        /// Flow id.
        flow_id: String,
        /// `enabled` or `disabled`.
        status: FlowStatus,
    },

    /// Edit a code step of a flow version file and print the updated step.
    CodeSettings(CodeSettingsArgs),
}

#[derive(Debug, Args)]
pub struct CodeSettingsArgs {
    /// JSON file holding a flow version.
    pub file: PathBuf,

    /// Name of the code step, e.g. `step_1`.
    #[arg(long)]
    pub step: String,

    /// Replace the step's code with the contents of this file.
    #[arg(long)]
    pub code_file: Option<PathBuf>,

    /// Replace the step's package.json with the contents of this file.
    #[arg(long)]
    pub package_json_file: Option<PathBuf>,

    /// Add or change an input, as `key=value`. Repeatable.
    #[arg(long = "input", value_parser = parse_input)]
    pub inputs: Vec<(String, String)>,

    /// Remove an input. Repeatable.
    #[arg(long = "remove-input")]
    pub remove_inputs: Vec<String>,

    /// Rename an input, as `old=new`. Repeatable.
    #[arg(long = "rename-input", value_parser = parse_input)]
    pub rename_inputs: Vec<(String, String)>,

    /// Open the form read-only; every edit is rejected.
    #[arg(long)]
    pub read_only: bool,

    /// Print the inputs help text and exit.
    #[arg(long)]
    pub help_inputs: bool,
}

fn parse_level(s: &str) -> Result<log::LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("unknown log level '{}', expected off/error/warn/info/debug/trace", s))
}

/// Parses `key=value`. The key may be empty so the form can report it.
fn parse_input(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}
