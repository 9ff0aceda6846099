//! Domain error types for acquiring and running the Tailwind CSS binary.

use color_eyre::Report;
use thiserror::Error;

/// Result alias for operations that may return a [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Result alias for binary acquisition fallible operations.
pub type AcquisitionResult<T> = std::result::Result<T, AcquisitionError>;

/// Result alias for configuration fallible operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result alias for fallible operations on a running Tailwind CSS process.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

/// Top-level error exposed by the crate.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Indicates the Tailwind CSS binary could not be acquired.
    #[error("binary acquisition failed")]
    Acquisition(#[from] AcquisitionError),
    /// Indicates configuration parsing failed.
    #[error("configuration parsing failed")]
    Config(#[from] ConfigError),
    /// Indicates the Tailwind CSS process failed to run to completion.
    #[error("tailwind css process failed")]
    Process(#[from] ProcessError),
}

/// Categorises acquisition failures so callers can branch on structured errors.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum AcquisitionErrorKind {
    /// Represents errors without a more specific semantic meaning, such as
    /// filesystem failures or an unexpected release page layout.
    #[default]
    Other,
    /// The requested version is not a valid semantic version. No I/O was
    /// attempted.
    InvalidVersion,
    /// No release artifact exists for the host operating system or
    /// architecture.
    UnsupportedPlatform,
    /// The upstream project has no release with the requested tag.
    NotFound,
    /// The release metadata or artifact could not be fetched.
    Network,
    /// A command needed an installed binary and none was available.
    NoCachedBinary,
    /// The operation observed its cancellation signal.
    Cancelled,
}

/// Captures acquisition-specific failures.
#[derive(Debug, Error)]
#[error("{report}")]
pub struct AcquisitionError {
    kind: AcquisitionErrorKind,
    #[source]
    report: Report,
}

impl AcquisitionError {
    /// Constructs a new acquisition error with the provided kind and
    /// diagnostic report.
    #[must_use]
    pub const fn new(kind: AcquisitionErrorKind, report: Report) -> Self {
        Self { kind, report }
    }

    /// Returns the semantic category for this acquisition failure.
    #[must_use]
    pub const fn kind(&self) -> AcquisitionErrorKind {
        self.kind
    }

    /// Extracts the underlying diagnostic report.
    pub fn into_report(self) -> Report {
        self.report
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(
            AcquisitionErrorKind::Cancelled,
            color_eyre::eyre::eyre!("operation cancelled"),
        )
    }
}

impl From<Report> for AcquisitionError {
    fn from(report: Report) -> Self {
        Self::new(AcquisitionErrorKind::Other, report)
    }
}

/// Captures configuration failures.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConfigError(#[from] Report);

/// Captures failures spawning or supervising the Tailwind CSS process.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ProcessError(#[from] Report);

impl From<AcquisitionError> for ProcessError {
    fn from(err: AcquisitionError) -> Self {
        Self(err.into_report())
    }
}
