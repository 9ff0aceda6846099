//! GitHub-backed [`ReleaseSource`].

use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{Context, eyre};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{ReleaseAsset, ReleaseInfo, ReleaseLookup, ReleaseSource};
use crate::error::{AcquisitionError, AcquisitionErrorKind, AcquisitionResult};
use crate::observability::RELEASE_TARGET;
use crate::platform::ArtifactName;
use crate::settings::AcquisitionSettings;
use crate::version::ReleaseTag;

/// Media type recommended by the GitHub REST API.
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Release payload returned by the metadata API.
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    assets: Vec<GitHubAsset>,
}

/// Asset entry within a [`GitHubRelease`].
#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

/// Release metadata and downloads from GitHub.
///
/// Holds one pooled HTTP client for the whole acquisition.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    pub(super) client: Client,
    api_base_url: Url,
    pub(super) site_base_url: Url,
    pub(super) artifact: ArtifactName,
    authorization: Option<HeaderValue>,
}

impl GitHubReleases {
    /// Builds a client from the acquisition settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be initialised or the
    /// configured token is not a valid header value.
    pub fn new(settings: &AcquisitionSettings) -> AcquisitionResult<Self> {
        let client = build_client(&settings.user_agent, settings.connect_timeout)?;
        let authorization = settings
            .github_token
            .as_ref()
            .map(|token| {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                        .context("GitHub token contains invalid header characters")?;
                value.set_sensitive(true);
                Ok::<_, color_eyre::Report>(value)
            })
            .transpose()?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.clone(),
            site_base_url: settings.site_base_url.clone(),
            artifact: settings.artifact.clone(),
            authorization,
        })
    }

    /// Queries the metadata API once and classifies the outcome.
    pub async fn lookup(&self, requested: Option<&ReleaseTag>) -> ReleaseLookup {
        let url = match self.metadata_url(requested) {
            Ok(url) => url,
            Err(err) => return ReleaseLookup::Failed(err),
        };
        debug!(target: RELEASE_TARGET, %url, "fetching release metadata");

        let mut request = self.client.get(url.clone()).header(ACCEPT, GITHUB_JSON);
        if let Some(value) = &self.authorization {
            request = request.header(AUTHORIZATION, value.clone());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                return ReleaseLookup::Failed(network_error(eyre!(
                    "failed to fetch release metadata from {url}: {err}"
                )));
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => ReleaseLookup::NotFound,
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => ReleaseLookup::RateLimited,
            status if !status.is_success() => ReleaseLookup::Failed(network_error(eyre!(
                "release metadata request to {url} failed with HTTP {status}"
            ))),
            _ => match response.json::<GitHubRelease>().await {
                Ok(release) => release
                    .into_release_info()
                    .map_or_else(ReleaseLookup::Failed, ReleaseLookup::Found),
                Err(err) => ReleaseLookup::Failed(network_error(eyre!(
                    "failed to decode release metadata from {url}: {err}"
                ))),
            },
        }
    }

    fn metadata_url(&self, requested: Option<&ReleaseTag>) -> AcquisitionResult<Url> {
        let path = requested.map_or_else(
            || "releases/latest".to_owned(),
            |tag| format!("releases/tags/{tag}"),
        );
        join_url(&self.api_base_url, &path)
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn release_info(&self, requested: Option<&ReleaseTag>) -> AcquisitionResult<ReleaseInfo> {
        match self.lookup(requested).await {
            ReleaseLookup::Found(info) => Ok(info),
            ReleaseLookup::NotFound => Err(not_found(requested)),
            ReleaseLookup::Failed(err) => Err(err),
            ReleaseLookup::RateLimited => {
                warn!(
                    target: RELEASE_TARGET,
                    "GitHub API rate limit reached; resolving the release from release pages"
                );
                self.release_info_from_pages(requested).await
            }
        }
    }

    async fn fetch_asset(&self, url: &Url) -> AcquisitionResult<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| network_error(eyre!("failed to download {url}: {err}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AcquisitionError::new(
                AcquisitionErrorKind::NotFound,
                eyre!("release asset not found at {url}"),
            ));
        }
        if !status.is_success() {
            return Err(network_error(eyre!(
                "download of {url} failed with HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| network_error(eyre!("failed to read {url}: {err}")))?;
        info!(target: RELEASE_TARGET, %url, bytes = bytes.len(), "downloaded release asset");
        Ok(bytes.to_vec())
    }
}

impl GitHubRelease {
    fn into_release_info(self) -> AcquisitionResult<ReleaseInfo> {
        let tag = ReleaseTag::parse(&self.tag_name).map_err(|err| {
            AcquisitionError::from(
                err.into_report()
                    .wrap_err("GitHub returned a release with a non-semver tag"),
            )
        })?;
        let assets = self
            .assets
            .into_iter()
            .map(|asset| -> AcquisitionResult<ReleaseAsset> {
                let download_url = Url::parse(&asset.browser_download_url).with_context(|| {
                    format!("asset '{}' has an invalid download URL", asset.name)
                })?;
                Ok(ReleaseAsset {
                    name: asset.name,
                    download_url,
                })
            })
            .collect::<AcquisitionResult<Vec<_>>>()?;
        Ok(ReleaseInfo { tag, assets })
    }
}

fn build_client(user_agent: &str, connect_timeout: Duration) -> AcquisitionResult<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .connect_timeout(connect_timeout)
        .build()
        .context("failed to create HTTP client")?;
    Ok(client)
}

pub(super) fn join_url(base: &Url, path: &str) -> AcquisitionResult<Url> {
    let url = base
        .join(path)
        .with_context(|| format!("failed to join '{path}' onto {base}"))?;
    Ok(url)
}

pub(super) fn network_error(report: color_eyre::Report) -> AcquisitionError {
    AcquisitionError::new(AcquisitionErrorKind::Network, report)
}

pub(super) fn not_found(requested: Option<&ReleaseTag>) -> AcquisitionError {
    let message = requested.map_or_else(
        || "no latest Tailwind CSS release was found".to_owned(),
        |tag| format!("Tailwind CSS release {tag} does not exist"),
    );
    AcquisitionError::new(AcquisitionErrorKind::NotFound, eyre!(message))
}
