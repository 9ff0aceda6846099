//! Installs the Tailwind CSS standalone CLI for the current platform and runs
//! it against a stylesheet.
//!
//! `install` downloads a release into the local cache, `build` and `watch`
//! run the cached binary (downloading it first when needed) and `clean`
//! empties the cache. Configuration is read from `TAILWIND_*` environment
//! variables via [`OrthoConfig`](https://github.com/leynos/ortho-config). The
//! binary exits with status code `0` on success and `1` on error.

use clap::Parser;
use tailwind_tool::{Cli, init_tracing};

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tailwind_tool::run(cli)?;
    Ok(())
}
