use anyhow::Result;
use clap::Parser;

use kw_cli::cli::{Cli, LogLevel, dispatch_command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.trace || cli.verbose {
        cli.effective_log_level()
    } else if let Ok(env_level) = std::env::var("KW_LOG_LEVEL") {
        LogLevel::from_str_loose(&env_level).unwrap_or(cli.log_level)
    } else {
        cli.log_level
    };

    let filter_str = if std::env::var("RUST_LOG").is_ok() {
        format!(
            "error,kw_cli={},kw_update={},kw_common={}",
            log_level.as_filter_str(),
            log_level.as_filter_str(),
            log_level.as_filter_str()
        )
    } else {
        log_level.as_filter_str().to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(&filter_str)
        .with_writer(std::io::stderr)
        .init();

    dispatch_command(cli).await
}
