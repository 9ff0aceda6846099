//! Cache directory creation and removal.

use color_eyre::eyre::Context;
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, info};

use super::BinaryCache;
use crate::error::AcquisitionResult;
use crate::observability::CACHE_TARGET;

impl BinaryCache {
    /// Creates the binaries directory when it does not yet exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> AcquisitionResult<()> {
        crate::fs::ensure_dir_exists(&self.dir)?;
        Ok(())
    }

    /// Deletes every regular file in the binaries directory and returns how
    /// many were removed.
    ///
    /// Entries for other artifacts are removed too. Subdirectories, including
    /// the lock directory, are left alone. A missing directory counts as
    /// already clean.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or a file cannot be
    /// deleted.
    pub fn remove_all(&self) -> AcquisitionResult<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(target: CACHE_TARGET, dir = %self.dir, "binaries directory absent");
                return Ok(0);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to list binaries directory {}", self.dir))
                    .map_err(Into::into);
            }
        };

        let mut removed = 0;
        for dir_entry in entries {
            let entry = dir_entry.with_context(|| format!("failed to read {}", self.dir))?;
            let is_file = entry
                .file_type()
                .with_context(|| format!("failed to stat {}", entry.path().display()))?
                .is_file();
            if is_file {
                fs::remove_file(entry.path())
                    .with_context(|| format!("failed to delete {}", entry.path().display()))?;
                removed += 1;
            }
        }

        info!(
            target: CACHE_TARGET,
            dir = %self.dir,
            removed,
            "cleaned downloaded Tailwind CSS binaries"
        );
        Ok(removed)
    }
}

