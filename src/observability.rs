//! Shared tracing configuration for observability instrumentation.
//!
//! Centralises the log targets used by the crate so subscribers can filter
//! acquisition events without pulling in unrelated application logs.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Target used by the acquisition state machine.
pub(crate) const ACQUIRE_TARGET: &str = "tailwind_tool::acquire";

/// Target used by cache lookups and removals.
pub(crate) const CACHE_TARGET: &str = "tailwind_tool::cache";

/// Target used by release metadata lookups.
pub(crate) const RELEASE_TARGET: &str = "tailwind_tool::release";

/// Target used for output relayed from the Tailwind CSS process.
pub(crate) const PROCESS_TARGET: &str = "tailwind_tool::process";

/// Installs the global `fmt` subscriber used by the command-line binary.
///
/// `RUST_LOG` takes precedence; otherwise `info` is used, or `debug` when
/// `verbose` is set. Repeated installation is ignored so tests and embedders
/// that already own a subscriber keep it.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_owned()))
        .with_target(verbose)
        .try_init();

    if let Err(err) = installed {
        tracing::debug!("tracing subscriber already installed: {err}");
    }
}
