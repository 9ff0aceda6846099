//! Fetches, caches and runs the Tailwind CSS standalone CLI.
//!
//! The library resolves which Tailwind CSS release to use, maps the host
//! platform to the matching release artifact, and keeps downloaded binaries in
//! a local cache keyed by `{tag}_{artifact}`. Release metadata comes from the
//! GitHub API; when that API is rate limited the public release pages are used
//! instead, and when the network is unavailable the newest cached binary
//! stands in for the requested one.
//!
//! # Examples
//!
//! ```no_run
//! use tailwind_tool::{BinaryManager, ToolEnvCfg};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> tailwind_tool::Result<()> {
//! let settings = ToolEnvCfg::load()?.to_settings()?;
//! let manager = BinaryManager::new(&settings)?;
//! let binary = manager
//!     .ensure_downloaded(Some("v4.0.0"), &CancellationToken::new())
//!     .await?;
//! println!("Tailwind CSS lives at {binary}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
mod cli;
mod download;
mod error;
mod fs;
mod manager;
mod observability;
mod platform;
mod process;
mod release;
mod settings;
#[doc(hidden)]
pub mod test_support;
mod version;

pub use cli::{BuildArgs, Cli, Command, run};
pub use download::download;
pub use error::{
    AcquisitionError, AcquisitionErrorKind, AcquisitionResult, ConfigError, ConfigResult,
    ProcessError, ProcessResult, Result, ToolError as Error,
};
pub use manager::BinaryManager;
pub use observability::init_tracing;
pub use platform::{Arch, ArtifactName, Os, PlatformTarget};
pub use process::{TailwindInvocation, run_tailwind};
pub use release::{GitHubReleases, ReleaseAsset, ReleaseInfo, ReleaseLookup, ReleaseSource};
pub use settings::{
    AcquisitionSettings, DEFAULT_API_BASE_URL, DEFAULT_SITE_BASE_URL, DEFAULT_USER_AGENT,
};
pub use version::{ReleaseTag, resolve_requested_version};

use color_eyre::eyre::eyre;
use ortho_config::OrthoConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use camino::Utf8PathBuf;
use std::ffi::OsString;

/// Environment variables consulted for a GitHub token when
/// `TAILWIND_GITHUB_TOKEN` is unset, in order.
const FALLBACK_TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Captures tool settings supplied via `TAILWIND_*` environment variables or
/// configuration files.
///
/// # Examples
/// ```
/// use tailwind_tool::ToolEnvCfg;
///
/// let cfg = ToolEnvCfg::default();
/// assert!(cfg.default_version.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, OrthoConfig, Default)]
#[ortho_config(prefix = "TAILWIND")]
pub struct ToolEnvCfg {
    /// Version used when a command does not pass `--tailwind-version`.
    pub default_version: Option<String>,
    /// Directory holding downloaded binaries.
    pub binaries_dir: Option<Utf8PathBuf>,
    /// Base URL of the release metadata API.
    pub api_base_url: Option<String>,
    /// Base URL of the public release pages and downloads.
    pub site_base_url: Option<String>,
    /// Token sent to the metadata API to lift its anonymous rate limit.
    pub github_token: Option<String>,
    /// User agent sent with every request.
    pub user_agent: Option<String>,
}

impl ToolEnvCfg {
    /// Loads configuration from environment variables without parsing CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when a configuration source cannot be parsed.
    pub fn load() -> ConfigResult<Self> {
        let args = [OsString::from("tailwind-tool")];
        Self::load_from_iter(args).map_err(|err| ConfigError::from(eyre!(err)))
    }

    /// Converts the configuration into immutable [`AcquisitionSettings`].
    ///
    /// Detects the host platform, resolves the binaries directory and
    /// validates every URL.
    ///
    /// # Errors
    ///
    /// Returns an acquisition error when the platform has no published
    /// artifact and a configuration error when a URL is invalid.
    pub fn to_settings(&self) -> Result<AcquisitionSettings> {
        let artifact = PlatformTarget::detect()?.artifact_name()?;
        let mut settings =
            AcquisitionSettings::new(cache::resolve_binaries_dir(self.binaries_dir.clone()), artifact)?;

        if let Some(url) = non_blank(self.api_base_url.as_deref()) {
            settings = settings.with_api_base_url(url)?;
        }
        if let Some(url) = non_blank(self.site_base_url.as_deref()) {
            settings = settings.with_site_base_url(url)?;
        }
        if let Some(agent) = non_blank(self.user_agent.as_deref()) {
            agent.clone_into(&mut settings.user_agent);
        }
        settings.github_token = self.github_token().map(SecretString::from);

        Ok(settings)
    }

    fn github_token(&self) -> Option<String> {
        non_blank(self.github_token.as_deref())
            .map(str::to_owned)
            .or_else(|| {
                FALLBACK_TOKEN_VARS.iter().find_map(|name| {
                    std::env::var(name)
                        .ok()
                        .filter(|value| !value.trim().is_empty())
                })
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
