//! Release metadata for the Tailwind CSS standalone CLI.
//!
//! [`GitHubReleases`] asks the GitHub REST API first. When that API reports
//! its unauthenticated rate limit (HTTP 403 or 429) the lookup switches to
//! the public release pages, which are not rate limited, and synthesises the
//! download URL from the project's fixed release layout.
//!
//! Failures surface as [`AcquisitionError`]s whose kind tells the caller how
//! to react:
//!
//! - [`AcquisitionErrorKind::NotFound`]: the tag does not exist upstream.
//! - [`AcquisitionErrorKind::Network`]: transport or server failure; a cached
//!   binary may stand in.
//! - anything else: unexpected and terminal.
//!
//! [`AcquisitionErrorKind::NotFound`]: crate::AcquisitionErrorKind::NotFound
//! [`AcquisitionErrorKind::Network`]: crate::AcquisitionErrorKind::Network

mod fallback;
mod github;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{AcquisitionError, AcquisitionResult};
use crate::platform::ArtifactName;
use crate::version::ReleaseTag;

pub use github::GitHubReleases;

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Asset filename, matching an [`ArtifactName`] for binary assets.
    pub name: String,
    /// Direct download location.
    pub download_url: Url,
}

/// Metadata for one release. Produced per acquisition attempt and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// The release tag.
    pub tag: ReleaseTag,
    /// Files attached to the release.
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseInfo {
    /// Returns the asset published for `artifact`, if any.
    #[must_use]
    pub fn asset(&self, artifact: &ArtifactName) -> Option<&ReleaseAsset> {
        self.assets
            .iter()
            .find(|asset| asset.name == artifact.as_str())
    }
}

/// Outcome of a single metadata API request.
///
/// Keeps the rate-limit branch explicit so the fallback decision is a match
/// rather than error inspection.
#[derive(Debug)]
pub enum ReleaseLookup {
    /// The API answered with release metadata.
    Found(ReleaseInfo),
    /// The API answered 404 for the requested release.
    NotFound,
    /// The API refused the request with HTTP 403 or 429.
    RateLimited,
    /// Any other failure.
    Failed(AcquisitionError),
}

/// Source of release metadata and artifact bytes.
///
/// [`GitHubReleases`] is the production implementation; the acquisition
/// state machine only depends on this trait.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Returns metadata for `requested`, or for the latest release when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when the release does not exist and a
    /// `Network` error for transport or server failures.
    async fn release_info(&self, requested: Option<&ReleaseTag>) -> AcquisitionResult<ReleaseInfo>;

    /// Downloads the full payload at `url`.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when the asset is missing and a `Network`
    /// error for other transport or server failures.
    async fn fetch_asset(&self, url: &Url) -> AcquisitionResult<Vec<u8>>;
}
