//! Command dispatch and execution handlers.

use anyhow::{Result, bail};

use super::args::*;
use crate::launch::LaunchPlan;
use crate::status::{check_status, version_line};
use crate::update_cmd::{LauncherSession, resolve_install_root};

/// Dispatch a CLI command to its handler.
///
/// Without a subcommand the launcher behaves like `launch`.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let root = resolve_install_root(cli.dir)?;
    let session = LauncherSession::open(&root)?;

    match cli.command {
        Some(Commands::Check) => run_check(&session).await,
        Some(Commands::Update) => run_update(&session).await,
        Some(Commands::Launch(args)) => run_launch(&session, args).await,
        None => run_launch(&session, LaunchArgs::default()).await,
    }
}

async fn run_check(session: &LauncherSession) -> Result<()> {
    let report = session.check().await?;
    println!("{}", version_line(&report));
    println!("{}", check_status(&report));
    Ok(())
}

async fn run_update(session: &LauncherSession) -> Result<()> {
    let summary = session.update_if_required().await?;
    println!("{}", summary.version_line());
    println!("{}", summary.status());
    if !summary.ready_to_launch() {
        bail!("{}", summary.status());
    }
    Ok(())
}

async fn run_launch(session: &LauncherSession, args: LaunchArgs) -> Result<()> {
    if args.skip_update {
        tracing::info!("Skipping update check");
    } else {
        let summary = session.update_if_required().await?;
        println!("{}", summary.version_line());
        println!("{}", summary.status());
        if !summary.ready_to_launch() {
            bail!("{}", summary.status());
        }
    }

    let mut config = session.config.clone();
    if let Some(host) = args.host {
        config.default_host = host;
    }
    if let Some(port) = args.port {
        config.default_port = port;
    }

    let plan = LaunchPlan::prepare(session.engine.layout(), &config).await?;
    let child = plan.spawn()?;
    match child.id() {
        Some(pid) => println!("Launched {} (pid {pid})", plan.program.display()),
        None => println!("Launched {}", plan.program.display()),
    }
    Ok(())
}
