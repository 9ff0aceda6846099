//! Resolution of the binaries directory.
//!
//! Prefers a directory beside the running executable, with XDG-compliant
//! fallbacks for installs where the executable location is unavailable.

use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Name of the directory created beside the executable.
const BINARIES_DIR_NAME: &str = "binaries";

/// Subdirectory path within the XDG cache home.
const CACHE_SUBDIR: &str = "tailwind-tool/binaries";

/// Resolves the binaries directory.
///
/// The resolution order is:
///
/// 1. `explicit` when provided and non-empty
/// 2. `binaries/` beside the current executable
/// 3. `$XDG_CACHE_HOME/tailwind-tool/binaries` if `XDG_CACHE_HOME` is set
/// 4. `~/.cache/tailwind-tool/binaries`
/// 5. `/tmp/tailwind-tool/binaries` as last resort
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use tailwind_tool::cache::resolve_binaries_dir;
///
/// let dir = resolve_binaries_dir(Some(Utf8PathBuf::from("/opt/tailwind")));
/// assert_eq!(dir.as_str(), "/opt/tailwind");
/// ```
#[must_use]
pub fn resolve_binaries_dir(explicit: Option<Utf8PathBuf>) -> Utf8PathBuf {
    if let Some(dir) = explicit.filter(|dir| !dir.as_str().trim().is_empty()) {
        return dir;
    }

    if let Some(dir) = resolve_beside_executable() {
        return dir;
    }

    if let Some(dir) = resolve_from_xdg_cache() {
        return dir;
    }

    if let Some(dir) = resolve_from_home() {
        return dir;
    }

    Utf8PathBuf::from("/tmp").join(CACHE_SUBDIR)
}

/// Attempts to resolve `binaries/` next to the running executable.
fn resolve_beside_executable() -> Option<Utf8PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let parent = exe.parent()?;
    let path = Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()?;
    Some(path.join(BINARIES_DIR_NAME))
}

/// Attempts to resolve the directory from `XDG_CACHE_HOME`.
fn resolve_from_xdg_cache() -> Option<Utf8PathBuf> {
    let raw = std::env::var("XDG_CACHE_HOME").ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let path = Utf8PathBuf::from_path_buf(PathBuf::from(trimmed)).ok()?;
    Some(path.join(CACHE_SUBDIR))
}

/// Attempts to resolve the directory from the home directory.
fn resolve_from_home() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir()?;
    let path = Utf8PathBuf::from_path_buf(home).ok()?;
    Some(path.join(".cache").join(CACHE_SUBDIR))
}
