//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "bartender", version, about = "Bartender appliance CLI")]
pub struct Cli {
    /// Path to the pump configuration JSON (required to start)
    #[arg(long, value_name = "FILE", default_value = "etc/pump_config.json")]
    pub pumps: PathBuf,

    /// Optional settings TOML; built-in defaults apply when absent
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Optional drink catalog TOML; the built-in list applies when absent
    #[arg(long, value_name = "FILE")]
    pub drinks: Option<PathBuf>,

    /// Emit structured JSON on errors
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive two-button appliance loop
    Run,
    /// Pour one drink by name, bypassing the menu
    Dispense {
        /// Drink name as listed in the catalog
        #[arg(long)]
        drink: String,
    },
    /// Run the fixed-duration clean cycle on every configured pump
    Clean,
    /// Quick health check (configuration parse + pourability report)
    SelfCheck,
}
