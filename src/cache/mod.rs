//! Local cache of downloaded Tailwind CSS binaries.
//!
//! Each cached binary is a single file named `{tag}_{artifact}` inside the
//! binaries directory, for example `v4.0.0_tailwindcss-linux-x64`. Filenames
//! are the only index: there is no manifest, so nothing else may write files
//! following that convention into the directory.
//!
//! # Cache Location
//!
//! The binaries directory is resolved in the following order:
//!
//! 1. An explicit directory from configuration (`TAILWIND_BINARIES_DIR`)
//! 2. `binaries/` beside the running executable
//! 3. `$XDG_CACHE_HOME/tailwind-tool/binaries` if `XDG_CACHE_HOME` is set
//! 4. `~/.cache/tailwind-tool/binaries` as fallback
//!
//! # Cross-Process Coordination
//!
//! Downloads take an exclusive per-tag file lock so parallel installers do
//! not interleave writes to the same entry.

mod config;
mod lock;
mod operations;

pub use config::resolve_binaries_dir;
pub use lock::CacheLock;
pub use operations::BinaryCache;
