//! Command-line surface of the `tailwind-tool` binary.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AcquisitionError;
use crate::manager::BinaryManager;
use crate::observability::ACQUIRE_TARGET;
use crate::process::{TailwindInvocation, run_tailwind};
use crate::{ToolEnvCfg, error::Result};

/// Installs and runs the Tailwind CSS standalone CLI.
#[derive(Debug, Parser)]
#[command(name = "tailwind-tool", version, about)]
pub struct Cli {
    /// Log debug diagnostics.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install the Tailwind CSS binary.
    Install {
        /// Version to install (e.g. v4.0.0, v3.4.17). Latest when omitted.
        #[arg(short = 't', long)]
        tailwind_version: Option<String>,
        /// Download again even when the version is already installed.
        #[arg(short, long)]
        overwrite: bool,
    },
    /// Generate the Tailwind CSS output once.
    Build(BuildArgs),
    /// Regenerate the Tailwind CSS output whenever inputs change.
    Watch(BuildArgs),
    /// Delete every downloaded Tailwind CSS binary.
    Clean,
}

/// Arguments shared by `build` and `watch`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Input stylesheet.
    #[arg(short, long)]
    pub input: Utf8PathBuf,
    /// Output stylesheet.
    #[arg(short, long)]
    pub output: Utf8PathBuf,
    /// Minify the output.
    #[arg(short, long)]
    pub minify: bool,
    /// Version to use (e.g. v4.0.0, v3.4.17). Latest when omitted.
    #[arg(short = 't', long)]
    pub tailwind_version: Option<String>,
}

/// Loads configuration and executes `cli` until it finishes or Ctrl-C is
/// pressed.
///
/// # Errors
///
/// Returns the first configuration, acquisition or process failure.
pub fn run(cli: Cli) -> Result<()> {
    let cfg = ToolEnvCfg::load()?;
    let settings = cfg.to_settings()?;
    let manager = BinaryManager::new(&settings)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create Tokio runtime")
        .map_err(AcquisitionError::from)?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(target: ACQUIRE_TARGET, "interrupt received, stopping");
                on_interrupt.cancel();
            }
        });

        let outcome = execute(cli.command, cfg.default_version.as_deref(), &manager, &cancel).await;
        interrupt.abort();
        outcome
    })
}

async fn execute(
    command: Command,
    default_version: Option<&str>,
    manager: &BinaryManager,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        Command::Install {
            tailwind_version,
            overwrite,
        } => {
            let version = tailwind_version.as_deref().or(default_version);
            let path = manager.install(version, overwrite, cancel).await?;
            info!(target: ACQUIRE_TARGET, path = %path, "Tailwind CSS is installed.");
        }
        Command::Build(args) => build(args, false, default_version, manager, cancel).await?,
        Command::Watch(args) => build(args, true, default_version, manager, cancel).await?,
        Command::Clean => {
            let removed = manager.clean()?;
            info!(
                target: ACQUIRE_TARGET,
                removed,
                "Removed {removed} Tailwind CSS binaries."
            );
        }
    }
    Ok(())
}

async fn build(
    args: BuildArgs,
    watch: bool,
    default_version: Option<&str>,
    manager: &BinaryManager,
    cancel: &CancellationToken,
) -> Result<()> {
    let version = args.tailwind_version.as_deref().or(default_version);
    let binary = manager.ensure_downloaded(version, cancel).await?;
    let invocation = TailwindInvocation {
        input: args.input,
        output: args.output,
        minify: args.minify,
        watch,
    };
    run_tailwind(&binary, &invocation, cancel).await?;
    Ok(())
}
