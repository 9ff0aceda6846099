//! Normalises user-supplied version strings into release tags.
//!
//! Tailwind CSS tags its releases as `v` followed by a semantic version. The
//! tag rendered here is the only spelling used for cache filenames and
//! release URLs.

use std::fmt;
use std::str::FromStr;

use color_eyre::eyre::eyre;
use semver::Version;

use crate::error::{AcquisitionError, AcquisitionErrorKind, AcquisitionResult};

/// A validated release tag such as `v4.0.0`.
///
/// Ordering follows semantic-version precedence, so `v4.0.0-beta.1` sorts
/// before `v4.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseTag(Version);

impl ReleaseTag {
    /// Parses a tag or bare version, accepting an optional leading `v` in
    /// either case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionErrorKind::InvalidVersion`] when the remainder is
    /// not a semantic version.
    ///
    /// # Examples
    ///
    /// ```
    /// use tailwind_tool::ReleaseTag;
    ///
    /// let tag = ReleaseTag::parse(" V4.0.0 ")?;
    /// assert_eq!(tag.to_string(), "v4.0.0");
    /// # Ok::<(), tailwind_tool::AcquisitionError>(())
    /// ```
    pub fn parse(input: &str) -> AcquisitionResult<Self> {
        let lowered = input.trim().to_lowercase();
        let bare = lowered.strip_prefix('v').unwrap_or(&lowered);
        Version::parse(bare).map(Self).map_err(|err| {
            AcquisitionError::new(
                AcquisitionErrorKind::InvalidVersion,
                eyre!("invalid Tailwind CSS version '{input}': {err}"),
            )
        })
    }

    /// Returns the underlying semantic version.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for ReleaseTag {
    type Err = AcquisitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolves an optional version argument.
///
/// `None`, empty, and whitespace-only input request the latest release and
/// yield `Ok(None)`. Anything else must parse as a [`ReleaseTag`].
///
/// # Errors
///
/// Returns [`AcquisitionErrorKind::InvalidVersion`] for malformed input.
///
/// # Examples
///
/// ```
/// use tailwind_tool::resolve_requested_version;
///
/// assert!(resolve_requested_version(Some("  "))?.is_none());
/// let tag = resolve_requested_version(Some("3.4.17"))?.expect("tag");
/// assert_eq!(tag.to_string(), "v3.4.17");
/// # Ok::<(), tailwind_tool::AcquisitionError>(())
/// ```
pub fn resolve_requested_version(input: Option<&str>) -> AcquisitionResult<Option<ReleaseTag>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => ReleaseTag::parse(raw).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("4.0.0", "v4.0.0")]
    #[case("v4.0.0", "v4.0.0")]
    #[case("V4.0.0", "v4.0.0")]
    #[case("  v3.4.17\n", "v3.4.17")]
    #[case("4.0.0-BETA.1", "v4.0.0-beta.1")]
    #[case("v4.1.0+build.7", "v4.1.0+build.7")]
    fn parse_renders_canonical_tag(#[case] input: &str, #[case] expected: &str) {
        let tag = ReleaseTag::parse(input).expect("valid version");
        assert_eq!(tag.to_string(), expected);
    }

    #[rstest]
    #[case("4.0.0")]
    #[case("V4.0.0-RC.2")]
    #[case("v3.4.17")]
    fn canonical_tag_is_a_fixed_point(#[case] input: &str) {
        let first = ReleaseTag::parse(input).expect("valid version");
        let second = ReleaseTag::parse(&first.to_string()).expect("canonical tag parses");
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[rstest]
    #[case("latest")]
    #[case("4")]
    #[case("4.0")]
    #[case("vv4.0.0")]
    #[case("4.0.0.0")]
    #[case("v")]
    fn malformed_versions_are_rejected(#[case] input: &str) {
        let err = ReleaseTag::parse(input).expect_err("invalid version");
        assert_eq!(err.kind(), AcquisitionErrorKind::InvalidVersion);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some(" \t"))]
    fn blank_input_requests_latest(#[case] input: Option<&str>) {
        assert!(resolve_requested_version(input).expect("blank is valid").is_none());
    }

    #[test]
    fn ordering_follows_semver_precedence() {
        let beta = ReleaseTag::parse("v4.0.0-beta.1").expect("beta");
        let stable = ReleaseTag::parse("v4.0.0").expect("stable");
        let old = ReleaseTag::parse("v3.4.17").expect("old");
        assert!(old < beta);
        assert!(beta < stable);
    }
}
