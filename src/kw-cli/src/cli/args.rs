//! CLI argument structures and parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors
    Warn,
    /// Show informational messages, warnings, and errors (default)
    #[default]
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse a level name, ignoring case.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// KW launcher
///
/// Keeps the game client up to date and starts it. Without a subcommand
/// the launcher updates when needed and then launches the game.
#[derive(Debug, Parser)]
#[command(name = "kw-launcher")]
#[command(author, version)]
#[command(about = "KW launcher - update and start the game client", long_about = None)]
pub struct Cli {
    /// Game install directory (defaults to the launcher's own directory)
    #[arg(long = "dir", short = 'd', value_name = "PATH", global = true)]
    pub dir: Option<PathBuf>,

    /// Set log verbosity level (error, warn, info, debug, trace)
    #[arg(
        long = "log-level",
        short = 'L',
        value_enum,
        default_value = "info",
        global = true
    )]
    pub log_level: LogLevel,

    /// Shorthand for --log-level debug
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Shorthand for --log-level trace
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check the manifest and report whether an update is required
    #[command(visible_alias = "c")]
    Check,

    /// Check for an update and apply it when required
    #[command(visible_alias = "u")]
    Update,

    /// Start the game client, updating first when required
    #[command(visible_alias = "l")]
    Launch(LaunchArgs),
}

/// Arguments for the launch command.
#[derive(Debug, Default, Args)]
pub struct LaunchArgs {
    /// Skip the update check and launch the installed files as they are
    #[arg(long = "skip-update")]
    pub skip_update: bool,

    /// Server host to connect to (overrides launcher_config.json)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port to connect to (overrides launcher_config.json)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

impl Cli {
    /// Effective log level after --trace and --verbose.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}
