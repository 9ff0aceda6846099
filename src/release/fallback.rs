//! Release resolution from the public release pages.
//!
//! Used once the metadata API is rate limited. The pages are not rate limited
//! but carry no asset listing, so the single asset this crate needs is
//! synthesised from the `releases/download/{tag}/{artifact}` convention.

use color_eyre::eyre::eyre;
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use super::github::{join_url, network_error, not_found};
use super::{GitHubReleases, ReleaseAsset, ReleaseInfo};
use crate::error::{AcquisitionError, AcquisitionResult};
use crate::observability::RELEASE_TARGET;
use crate::version::ReleaseTag;

impl GitHubReleases {
    /// Resolves release metadata without calling the metadata API.
    pub(super) async fn release_info_from_pages(
        &self,
        requested: Option<&ReleaseTag>,
    ) -> AcquisitionResult<ReleaseInfo> {
        let tag = match requested {
            Some(tag) => {
                self.confirm_tag_page(tag).await?;
                tag.clone()
            }
            None => self.resolve_latest_tag().await?,
        };

        let download_url = self.direct_download_url(&tag)?;
        info!(
            target: RELEASE_TARGET,
            version = %tag,
            url = %download_url,
            "resolved release from release pages"
        );
        Ok(ReleaseInfo {
            tag,
            assets: vec![ReleaseAsset {
                name: self.artifact.as_str().to_owned(),
                download_url,
            }],
        })
    }

    /// Returns the conventional download URL of this platform's artifact for
    /// `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured site URL cannot be extended.
    pub fn direct_download_url(&self, tag: &ReleaseTag) -> AcquisitionResult<Url> {
        join_url(
            &self.site_base_url,
            &format!("releases/download/{tag}/{}", self.artifact),
        )
    }

    /// Follows the "latest release" redirect and reads the tag from the final
    /// URL, which must end in `.../tag/{tag}`.
    async fn resolve_latest_tag(&self) -> AcquisitionResult<ReleaseTag> {
        let url = join_url(&self.site_base_url, "releases/latest")?;
        debug!(target: RELEASE_TARGET, %url, "following latest release redirect");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| network_error(eyre!("failed to fetch {url}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network_error(eyre!(
                "latest release page {url} answered HTTP {status}"
            )));
        }

        tag_from_release_url(response.url())
    }

    /// Checks that the release page for `tag` exists.
    async fn confirm_tag_page(&self, tag: &ReleaseTag) -> AcquisitionResult<()> {
        let url = join_url(&self.site_base_url, &format!("releases/tag/{tag}"))?;
        debug!(target: RELEASE_TARGET, %url, "probing release page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| network_error(eyre!("failed to fetch {url}: {err}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(network_error(eyre!(
                "release page {url} answered HTTP {status}"
            )))
        } else {
            Err(not_found(Some(tag)))
        }
    }
}

/// Extracts the tag from a resolved release URL such as
/// `https://github.com/tailwindlabs/tailwindcss/releases/tag/v4.1.0`.
///
/// Any other shape is reported instead of guessed at.
pub(super) fn tag_from_release_url(url: &Url) -> AcquisitionResult<ReleaseTag> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|parts| parts.filter(|part| !part.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., "tag", raw_tag] => ReleaseTag::parse(raw_tag).map_err(|err| {
            AcquisitionError::from(
                err.into_report()
                    .wrap_err(format!("latest release redirect ended at {url}")),
            )
        }),
        _ => Err(AcquisitionError::from(eyre!(
            "latest release redirect ended at {url}, expected a path ending in tag/{{version}}"
        ))),
    }
}
