//! Writes downloaded artifacts into the cache.
//!
//! The payload lands in a temporary file inside the binaries directory. On
//! Linux and macOS that file is marked executable with `chmod +x`, and only
//! then is it renamed over the destination. A cache entry is therefore always
//! complete and runnable; a failed or cancelled download leaves nothing behind.

use std::future::Future;
use std::io::Write as _;
use std::path::Path;

use camino::Utf8Path;
use color_eyre::eyre::{Context, eyre};
use reqwest::Url;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{AcquisitionError, AcquisitionResult};
use crate::observability::ACQUIRE_TARGET;
use crate::release::ReleaseSource;
use crate::version::ReleaseTag;

const CHMOD: &str = "chmod";

/// Runs `operation` unless `cancel` fires first.
pub(crate) async fn unless_cancelled<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = AcquisitionResult<T>>,
) -> AcquisitionResult<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(AcquisitionError::cancelled()),
        result = operation => result,
    }
}

/// Downloads `url` into `destination`, replacing any existing file, and makes
/// the result executable on POSIX hosts.
///
/// # Errors
///
/// Fetch failures propagate unchanged from `source`. Filesystem and `chmod`
/// failures are reported as [`AcquisitionErrorKind::Other`], and observing
/// `cancel` yields [`AcquisitionErrorKind::Cancelled`]. In every error case
/// `destination` is left as it was.
///
/// [`AcquisitionErrorKind::Other`]: crate::AcquisitionErrorKind::Other
/// [`AcquisitionErrorKind::Cancelled`]: crate::AcquisitionErrorKind::Cancelled
pub async fn download(
    source: &dyn ReleaseSource,
    tag: &ReleaseTag,
    url: &Url,
    destination: &Utf8Path,
    cancel: &CancellationToken,
) -> AcquisitionResult<()> {
    download_with(source, tag, url, destination, CHMOD, cancel).await
}

async fn download_with(
    source: &dyn ReleaseSource,
    tag: &ReleaseTag,
    url: &Url,
    destination: &Utf8Path,
    chmod: &str,
    cancel: &CancellationToken,
) -> AcquisitionResult<()> {
    info!(
        target: ACQUIRE_TARGET,
        version = %tag,
        %url,
        "Downloading Tailwind CSS {tag} from: {url}"
    );

    let bytes = unless_cancelled(cancel, source.fetch_asset(url)).await?;
    debug!(
        target: ACQUIRE_TARGET,
        version = %tag,
        sha256 = %format!("{:x}", Sha256::digest(&bytes)),
        bytes = bytes.len(),
        "fetched artifact"
    );

    let parent = destination
        .parent()
        .ok_or_else(|| eyre!("{destination} has no parent directory"))?
        .to_path_buf();
    let writer = tokio::task::spawn_blocking(move || stage(&bytes, &parent));
    let staged = unless_cancelled(cancel, async {
        writer.await.context("artifact writer task failed")?
    })
    .await?;

    // Dropping `staged` on any early return deletes the temporary file.
    make_executable(staged.path(), chmod, cancel).await?;

    let target = destination.to_path_buf();
    let publisher = tokio::task::spawn_blocking(move || publish(staged, &target));
    unless_cancelled(cancel, async {
        publisher.await.context("artifact publish task failed")?
    })
    .await?;

    info!(
        target: ACQUIRE_TARGET,
        version = %tag,
        path = %destination,
        "Successfully downloaded Tailwind CSS {tag}."
    );
    Ok(())
}

/// Writes `bytes` to a fresh temporary file inside `dir`.
fn stage(bytes: &[u8], dir: &Utf8Path) -> AcquisitionResult<NamedTempFile> {
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {dir}"))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .with_context(|| format!("failed to write {}", staged.path().display()))?;
    Ok(staged)
}

/// Renames `staged` over `destination`.
fn publish(staged: NamedTempFile, destination: &Utf8Path) -> AcquisitionResult<()> {
    staged
        .persist(destination)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to move artifact into {destination}"))?;
    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
async fn make_executable(
    path: &Path,
    chmod: &str,
    cancel: &CancellationToken,
) -> AcquisitionResult<()> {
    let mut command = tokio::process::Command::new(chmod);
    command.arg("+x").arg(path).kill_on_drop(true);

    let status = unless_cancelled(cancel, async {
        command
            .status()
            .await
            .with_context(|| format!("failed to spawn {chmod} for {}", path.display()))
            .map_err(AcquisitionError::from)
    })
    .await?;

    if status.success() {
        Ok(())
    } else {
        Err(AcquisitionError::from(eyre!(
            "{chmod} +x {} exited with {status}",
            path.display()
        )))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
#[expect(
    clippy::unused_async,
    reason = "keeps one call shape across platforms"
)]
async fn make_executable(
    _path: &Path,
    _chmod: &str,
    _cancel: &CancellationToken,
) -> AcquisitionResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquisitionErrorKind;
    use crate::release::ReleaseInfo;
    use async_trait::async_trait;
    use camino::Utf8PathBuf;
    use tempfile::tempdir;

    struct StaticSource(Vec<u8>);

    #[async_trait]
    impl ReleaseSource for StaticSource {
        async fn release_info(
            &self,
            _requested: Option<&ReleaseTag>,
        ) -> AcquisitionResult<ReleaseInfo> {
            Err(AcquisitionError::from(eyre!("not used")))
        }

        async fn fetch_asset(&self, _url: &Url) -> AcquisitionResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn fixture_paths() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempdir().expect("tempdir");
        let dest = Utf8Path::from_path(temp.path())
            .expect("utf8 path")
            .join("v4.0.0_tailwindcss-linux-x64");
        (temp, dest)
    }

    #[tokio::test]
    async fn download_writes_payload_and_replaces_existing_file() {
        let (_temp, dest) = fixture_paths();
        std::fs::write(&dest, b"stale").expect("seed stale file");
        let tag = ReleaseTag::parse("v4.0.0").expect("tag");
        let url = Url::parse("https://example.test/artifact").expect("url");

        download(
            &StaticSource(b"fresh binary".to_vec()),
            &tag,
            &url,
            &dest,
            &CancellationToken::new(),
        )
        .await
        .expect("download");

        assert_eq!(std::fs::read(&dest).expect("read"), b"fresh binary");
        let leftovers = std::fs::read_dir(dest.parent().expect("parent"))
            .expect("list")
            .count();
        assert_eq!(leftovers, 1, "temporary file should be renamed away");
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[tokio::test]
    async fn download_marks_binary_executable() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, dest) = fixture_paths();
        let tag = ReleaseTag::parse("v4.0.0").expect("tag");
        let url = Url::parse("https://example.test/artifact").expect("url");

        download(
            &StaticSource(b"#!/bin/sh\n".to_vec()),
            &tag,
            &url,
            &dest,
            &CancellationToken::new(),
        )
        .await
        .expect("download");

        let mode = std::fs::metadata(&dest).expect("metadata").permissions().mode();
        assert_ne!(mode & 0o111, 0, "binary should be executable");
    }

    #[tokio::test]
    async fn cancelled_download_leaves_no_entry() {
        let (_temp, dest) = fixture_paths();
        let tag = ReleaseTag::parse("v4.0.0").expect("tag");
        let url = Url::parse("https://example.test/artifact").expect("url");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = download(&StaticSource(Vec::new()), &tag, &url, &dest, &cancel)
            .await
            .expect_err("cancelled");

        assert_eq!(err.kind(), AcquisitionErrorKind::Cancelled);
        assert!(!dest.exists());
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[tokio::test]
    async fn failed_chmod_publishes_nothing() {
        let (_temp, dest) = fixture_paths();
        let tag = ReleaseTag::parse("v4.0.0").expect("tag");
        let url = Url::parse("https://example.test/artifact").expect("url");

        let err = download_with(
            &StaticSource(b"#!/bin/sh\n".to_vec()),
            &tag,
            &url,
            &dest,
            "false",
            &CancellationToken::new(),
        )
        .await
        .expect_err("chmod failure");

        assert_eq!(err.kind(), AcquisitionErrorKind::Other);
        assert!(!dest.exists(), "non-executable entry was published");
        let leftovers = std::fs::read_dir(dest.parent().expect("parent"))
            .expect("list")
            .count();
        assert_eq!(leftovers, 0, "temporary file should be removed");
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[tokio::test]
    async fn failed_chmod_keeps_previous_entry() {
        let (_temp, dest) = fixture_paths();
        std::fs::write(&dest, b"previous binary").expect("seed entry");
        let tag = ReleaseTag::parse("v4.0.0").expect("tag");
        let url = Url::parse("https://example.test/artifact").expect("url");

        download_with(
            &StaticSource(b"replacement".to_vec()),
            &tag,
            &url,
            &dest,
            "false",
            &CancellationToken::new(),
        )
        .await
        .expect_err("chmod failure");

        assert_eq!(std::fs::read(&dest).expect("read"), b"previous binary");
    }
}
