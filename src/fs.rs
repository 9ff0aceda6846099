//! Shared filesystem helpers that operate within the capability sandbox.

use camino::Utf8Path;
#[cfg(unix)]
use camino::Utf8PathBuf;
#[cfg(unix)]
use cap_std::{ambient_authority, fs::Dir};
use color_eyre::eyre::{Context, Result};
#[cfg(unix)]
use std::io::ErrorKind;

/// Resolves a path to an ambient directory handle paired with the relative path component.
///
/// Absolute paths are opened relative to the ambient root; relative paths reuse the current
/// working directory.
#[cfg(unix)]
pub(crate) fn ambient_dir_and_path(path: &Utf8Path) -> Result<(Dir, Utf8PathBuf)> {
    if path.has_root() {
        let stripped = path
            .strip_prefix("/")
            .map_or_else(|_| path.to_path_buf(), Utf8Path::to_path_buf);
        let dir = Dir::open_ambient_dir("/", ambient_authority())
            .context("open ambient root directory")?;
        Ok((dir, stripped))
    } else {
        let dir = Dir::open_ambient_dir(".", ambient_authority())
            .context("open ambient working directory")?;
        Ok((dir, path.to_path_buf()))
    }
}

/// Ensures the provided path exists, creating intermediate directories when required.
#[cfg(unix)]
pub(crate) fn ensure_dir_exists(path: &Utf8Path) -> Result<()> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }

    dir.create_dir_all(relative.as_std_path())
        .or_else(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                Ok(())
            } else {
                Err(err)
            }
        })
        .with_context(|| format!("create {}", path.as_str()))
}

/// Drive-prefixed paths cannot be opened relative to an ambient root, so
/// non-Unix hosts create the directory directly.
#[cfg(not(unix))]
pub(crate) fn ensure_dir_exists(path: &Utf8Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("create {}", path.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_dir_exists_creates_nested_directories() {
        let temp = tempdir().expect("tempdir");
        let root = Utf8Path::from_path(temp.path()).expect("utf8 path");
        let nested = root.join("a/b/binaries");

        ensure_dir_exists(&nested).expect("create nested");
        ensure_dir_exists(&nested).expect("second call is a no-op");

        assert!(nested.is_dir());
    }
}
