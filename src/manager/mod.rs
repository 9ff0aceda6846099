//! Acquire-or-reuse orchestration for the Tailwind CSS binary.
//!
//! [`BinaryManager::ensure_downloaded`] walks three tiers in order:
//!
//! 1. An exact cache hit for a pinned version returns without any network
//!    traffic.
//! 2. Otherwise the release is resolved upstream and downloaded unless the
//!    resolved tag is already cached.
//! 3. When the upstream path fails with a network error, the newest installed
//!    binary stands in and a warning names both versions.
//!
//! A release that does not exist upstream is never substituted.

use std::sync::Arc;

use camino::Utf8PathBuf;
use color_eyre::eyre::{Context, eyre};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{BinaryCache, CacheLock};
use crate::download::{download, unless_cancelled};
use crate::error::{AcquisitionError, AcquisitionErrorKind, AcquisitionResult};
use crate::observability::ACQUIRE_TARGET;
use crate::release::{GitHubReleases, ReleaseSource};
use crate::settings::AcquisitionSettings;
use crate::version::{ReleaseTag, resolve_requested_version};

/// Locates, downloads and caches Tailwind CSS binaries.
#[derive(Clone)]
pub struct BinaryManager {
    cache: BinaryCache,
    source: Arc<dyn ReleaseSource>,
}

impl std::fmt::Debug for BinaryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryManager")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl BinaryManager {
    /// Creates a manager backed by GitHub releases.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built from `settings`.
    pub fn new(settings: &AcquisitionSettings) -> AcquisitionResult<Self> {
        let source = GitHubReleases::new(settings)?;
        Ok(Self::with_source(settings.cache(), Arc::new(source)))
    }

    /// Creates a manager over an arbitrary release source.
    #[must_use]
    pub const fn with_source(cache: BinaryCache, source: Arc<dyn ReleaseSource>) -> Self {
        Self { cache, source }
    }

    /// Returns the cache this manager reads and writes.
    #[must_use]
    pub const fn cache(&self) -> &BinaryCache {
        &self.cache
    }

    /// Returns a local path to a runnable binary for `version`, or for the
    /// latest release when `version` is `None` or blank.
    ///
    /// # Errors
    ///
    /// - [`AcquisitionErrorKind::InvalidVersion`] before any I/O when
    ///   `version` is malformed.
    /// - [`AcquisitionErrorKind::NotFound`] when the release does not exist
    ///   upstream, even if other versions are cached.
    /// - [`AcquisitionErrorKind::Network`] when upstream is unreachable and
    ///   nothing is cached.
    /// - [`AcquisitionErrorKind::Cancelled`] when `cancel` fires.
    pub async fn ensure_downloaded(
        &self,
        version: Option<&str>,
        cancel: &CancellationToken,
    ) -> AcquisitionResult<Utf8PathBuf> {
        let requested = resolve_requested_version(version)?;

        if let Some(tag) = &requested {
            if self.cache.exists(tag) {
                log_already_installed(tag);
                return Ok(self.cache.entry_path(tag));
            }
        }

        match self.fetch_release(requested.as_ref(), false, cancel).await {
            Err(err) if err.kind() == AcquisitionErrorKind::Network => {
                self.fall_back_to_installed(requested.as_ref(), err)
            }
            outcome => outcome,
        }
    }

    /// Installs `version` (latest when `None`) and returns its path.
    ///
    /// Without `overwrite` this behaves exactly like
    /// [`ensure_downloaded`](Self::ensure_downloaded). With `overwrite` the
    /// release is always resolved upstream and its binary downloaded again,
    /// replacing any cached copy; network failures are reported rather than
    /// papered over with another version.
    ///
    /// # Errors
    ///
    /// See [`ensure_downloaded`](Self::ensure_downloaded).
    pub async fn install(
        &self,
        version: Option<&str>,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> AcquisitionResult<Utf8PathBuf> {
        if !overwrite {
            return self.ensure_downloaded(version, cancel).await;
        }

        let requested = resolve_requested_version(version)?;
        self.fetch_release(requested.as_ref(), true, cancel).await
    }

    /// Returns an installed binary without touching the network.
    ///
    /// A pinned `version` must be cached exactly; otherwise the newest cached
    /// version is used.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionErrorKind::NoCachedBinary`] when no suitable
    /// binary is installed and [`AcquisitionErrorKind::InvalidVersion`] when
    /// `version` is malformed.
    pub fn resolve_installed(&self, version: Option<&str>) -> AcquisitionResult<Utf8PathBuf> {
        match resolve_requested_version(version)? {
            Some(tag) if self.cache.exists(&tag) => Ok(self.cache.entry_path(&tag)),
            Some(tag) => Err(AcquisitionError::new(
                AcquisitionErrorKind::NoCachedBinary,
                eyre!(
                    "Tailwind CSS {tag} is not installed in {}; run `install -t {tag}` first",
                    self.cache.dir()
                ),
            )),
            None => self
                .cache
                .find_latest_installed()
                .map(|(_, path)| path)
                .ok_or_else(|| {
                    AcquisitionError::new(
                        AcquisitionErrorKind::NoCachedBinary,
                        eyre!(
                            "no Tailwind CSS binary is installed in {}; run `install` first",
                            self.cache.dir()
                        ),
                    )
                }),
        }
    }

    /// Deletes every cached binary and returns how many files were removed.
    ///
    /// # Errors
    ///
    /// Returns an error when a cached file cannot be deleted.
    pub fn clean(&self) -> AcquisitionResult<usize> {
        self.cache.remove_all()
    }

    async fn fetch_release(
        &self,
        requested: Option<&ReleaseTag>,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> AcquisitionResult<Utf8PathBuf> {
        let release = unless_cancelled(cancel, self.source.release_info(requested)).await?;
        let tag = &release.tag;
        let destination = self.cache.entry_path(tag);

        if requested.is_none() {
            info!(
                target: ACQUIRE_TARGET,
                version = %tag,
                "Latest version of Tailwind CSS is {tag}."
            );
        }
        if !overwrite && self.cache.exists(tag) {
            log_already_installed(tag);
            return Ok(destination);
        }

        let artifact = self.cache.artifact();
        let url = release
            .asset(artifact)
            .map(|asset| asset.download_url.clone())
            .ok_or_else(|| eyre!("release {tag} publishes no {artifact} asset"))?;

        self.cache.ensure_dir()?;
        let _lock = self.lock_entry(tag, cancel).await?;

        // Another process may have finished the same download while we waited.
        if !overwrite && self.cache.exists(tag) {
            debug!(
                target: ACQUIRE_TARGET,
                version = %tag,
                "binary installed by another process"
            );
            return Ok(destination);
        }

        download(self.source.as_ref(), tag, &url, &destination, cancel).await?;
        Ok(destination)
    }

    async fn lock_entry(
        &self,
        tag: &ReleaseTag,
        cancel: &CancellationToken,
    ) -> AcquisitionResult<CacheLock> {
        let dir = self.cache.dir().to_path_buf();
        let key = tag.to_string();
        let pending = tokio::task::spawn_blocking(move || CacheLock::acquire_exclusive(&dir, &key));

        unless_cancelled(cancel, async {
            let lock = pending
                .await
                .context("cache lock task failed")?
                .with_context(|| format!("failed to lock cache entry for {tag}"))?;
            Ok::<_, AcquisitionError>(lock)
        })
        .await
    }

    fn fall_back_to_installed(
        &self,
        requested: Option<&ReleaseTag>,
        err: AcquisitionError,
    ) -> AcquisitionResult<Utf8PathBuf> {
        let Some((installed, path)) = self.cache.find_latest_installed() else {
            return Err(err);
        };

        let attempted = requested.map_or_else(|| "latest".to_owned(), ToString::to_string);
        warn!(
            target: ACQUIRE_TARGET,
            attempted = %attempted,
            version = %installed,
            error = %err,
            "Could not get Tailwind CSS {attempted}; using latest installed version {installed}."
        );
        Ok(path)
    }
}

fn log_already_installed(tag: &ReleaseTag) {
    info!(
        target: ACQUIRE_TARGET,
        version = %tag,
        "Tailwind CSS {tag} already exists, skipping download."
    );
}
