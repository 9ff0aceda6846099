//! Immutable configuration for binary acquisition.
//!
//! Built once at start-up, usually through
//! [`ToolEnvCfg::to_settings`](crate::ToolEnvCfg::to_settings), and passed by
//! reference to everything that needs the binaries directory or the
//! platform's artifact name.

use std::time::Duration;

use camino::Utf8PathBuf;
use color_eyre::eyre::{Context, eyre};
use reqwest::Url;
use secrecy::SecretString;

use crate::cache::BinaryCache;
use crate::error::{ConfigError, ConfigResult};
use crate::platform::ArtifactName;

/// GitHub REST API base for the Tailwind CSS repository.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com/repos/tailwindlabs/tailwindcss/";

/// Public site base for the Tailwind CSS repository.
pub const DEFAULT_SITE_BASE_URL: &str = "https://github.com/tailwindlabs/tailwindcss/";

/// The metadata API rejects requests without a user agent.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the acquisition subsystem needs to know about its environment.
#[derive(Debug)]
pub struct AcquisitionSettings {
    /// Directory holding cached binaries.
    pub binaries_dir: Utf8PathBuf,
    /// Artifact filename for the host platform.
    pub artifact: ArtifactName,
    /// Base URL of the release metadata API. Always ends with `/`.
    pub api_base_url: Url,
    /// Base URL of the public release pages. Always ends with `/`.
    pub site_base_url: Url,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Optional token that lifts the metadata API's anonymous rate limit.
    pub github_token: Option<SecretString>,
    /// Connection timeout applied to every request.
    pub connect_timeout: Duration,
}

impl AcquisitionSettings {
    /// Creates settings with the default upstream endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in endpoint constants fail to parse.
    pub fn new(binaries_dir: Utf8PathBuf, artifact: ArtifactName) -> ConfigResult<Self> {
        Ok(Self {
            binaries_dir,
            artifact,
            api_base_url: parse_base_url(DEFAULT_API_BASE_URL)?,
            site_base_url: parse_base_url(DEFAULT_SITE_BASE_URL)?,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            github_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Replaces the metadata API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not an absolute URL.
    pub fn with_api_base_url(mut self, raw: &str) -> ConfigResult<Self> {
        self.api_base_url = parse_base_url(raw)?;
        Ok(self)
    }

    /// Replaces the release pages base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not an absolute URL.
    pub fn with_site_base_url(mut self, raw: &str) -> ConfigResult<Self> {
        self.site_base_url = parse_base_url(raw)?;
        Ok(self)
    }

    /// Returns a cache handle for the configured directory and artifact.
    #[must_use]
    pub fn cache(&self) -> BinaryCache {
        BinaryCache::new(self.binaries_dir.clone(), self.artifact.clone())
    }
}

/// Parses a base URL, appending the trailing `/` that relative joins need.
pub(crate) fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let trimmed = raw.trim();
    let normalised = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalised)
        .with_context(|| format!("invalid base URL '{raw}'"))
        .map_err(ConfigError::from)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::from(eyre!("'{raw}' cannot be used as a base URL")));
    }
    Ok(url)
}
