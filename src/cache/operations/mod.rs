//! Cache lookup and removal operations.
//!
//! [`BinaryCache`] addresses entries by `(tag, artifact)` and never keeps
//! state beyond the directory path, so every query reflects the filesystem.

mod lookup;
mod remove;

use camino::{Utf8Path, Utf8PathBuf};

use crate::platform::ArtifactName;
use crate::version::ReleaseTag;

/// Handle on the binaries directory for one artifact flavour.
#[derive(Debug, Clone)]
pub struct BinaryCache {
    dir: Utf8PathBuf,
    artifact: ArtifactName,
}

impl BinaryCache {
    /// Creates a handle for `artifact` entries stored under `dir`.
    ///
    /// The directory is not touched until an operation needs it.
    #[must_use]
    pub const fn new(dir: Utf8PathBuf, artifact: ArtifactName) -> Self {
        Self { dir, artifact }
    }

    /// Returns the binaries directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the artifact filename entries are keyed by.
    #[must_use]
    pub const fn artifact(&self) -> &ArtifactName {
        &self.artifact
    }

    /// Returns the path of the entry for `tag`, whether or not it exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use tailwind_tool::{ArtifactName, ReleaseTag, cache::BinaryCache};
    ///
    /// let cache = BinaryCache::new(
    ///     Utf8PathBuf::from("/opt/binaries"),
    ///     ArtifactName::new("tailwindcss-linux-x64"),
    /// );
    /// let tag = ReleaseTag::parse("4.0.0")?;
    /// assert_eq!(
    ///     cache.entry_path(&tag).as_str(),
    ///     "/opt/binaries/v4.0.0_tailwindcss-linux-x64",
    /// );
    /// # Ok::<(), tailwind_tool::AcquisitionError>(())
    /// ```
    #[must_use]
    pub fn entry_path(&self, tag: &ReleaseTag) -> Utf8PathBuf {
        self.dir.join(format!("{tag}_{}", self.artifact))
    }

    /// Suffix shared by every entry for this artifact.
    fn entry_suffix(&self) -> String {
        format!("_{}", self.artifact)
    }
}

#[cfg(test)]
mod tests;
