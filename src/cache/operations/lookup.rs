//! Cache hit detection and installed-version discovery.

use camino::Utf8PathBuf;
use std::fs;
use tracing::debug;

use super::BinaryCache;
use crate::observability::CACHE_TARGET;
use crate::version::ReleaseTag;

impl BinaryCache {
    /// Returns `true` when an entry for `tag` exists as a regular file.
    #[must_use]
    pub fn exists(&self, tag: &ReleaseTag) -> bool {
        let path = self.entry_path(tag);
        let hit = path.is_file();
        debug!(
            target: CACHE_TARGET,
            version = %tag,
            path = %path,
            hit,
            "cache lookup"
        );
        hit
    }

    /// Finds the newest installed tag for this artifact.
    ///
    /// Scans the binaries directory for files named `v*_{artifact}` and
    /// returns the entry with the highest semantic version. Entries whose
    /// version part does not parse are skipped. Returns `None` when the
    /// directory is missing or holds no entries.
    #[must_use]
    pub fn find_latest_installed(&self) -> Option<(ReleaseTag, Utf8PathBuf)> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(
                    target: CACHE_TARGET,
                    dir = %self.dir,
                    error = %err,
                    "failed to read binaries directory"
                );
                return None;
            }
        };

        let suffix = self.entry_suffix();
        let (tag, path) = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .filter_map(|entry| {
                let file_name = entry.file_name().into_string().ok()?;
                let tag = parse_entry_name(&file_name, &suffix)?;
                Some((tag, self.dir.join(file_name)))
            })
            .max_by(|a, b| a.0.cmp(&b.0))?;

        debug!(
            target: CACHE_TARGET,
            version = %tag,
            path = %path,
            "found latest installed version"
        );
        Some((tag, path))
    }
}

/// Extracts the tag from an entry filename such as `v4.0.0_tailwindcss-linux-x64`.
fn parse_entry_name(file_name: &str, suffix: &str) -> Option<ReleaseTag> {
    let tag = file_name.strip_suffix(suffix)?;
    if !tag.starts_with('v') {
        return None;
    }
    ReleaseTag::parse(tag).ok()
}
