//! Maps the host platform to the Tailwind CSS release artifact it can run.
//!
//! Detection happens once while building
//! [`AcquisitionSettings`](crate::AcquisitionSettings); the resulting
//! [`ArtifactName`] is immutable for the rest of the process.

use std::fmt;
use std::path::Path;

use color_eyre::eyre::eyre;

use crate::error::{AcquisitionError, AcquisitionErrorKind, AcquisitionResult};

/// Prefix shared by every published artifact.
const TOOL_NAME: &str = "tailwindcss";

/// Loader and libc paths whose presence marks a musl-based distribution.
///
/// Best-effort only: distributions that install musl elsewhere are treated as
/// glibc systems.
const MUSL_MARKERS: [&str; 2] = ["/lib/ld-musl-x86_64.so.1", "/lib/libc.musl-x86_64.so.1"];

/// Operating systems with published artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Microsoft Windows.
    Windows,
    /// Linux with either glibc or musl.
    Linux,
    /// Apple macOS.
    MacOs,
}

/// CPU architectures with published artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit x86.
    X64,
    /// 64-bit ARM.
    Arm64,
}

impl Arch {
    const fn identifier(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }
}

/// The platform the current process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    /// Host operating system.
    pub os: Os,
    /// Host CPU architecture.
    pub arch: Arch,
    /// Whether the host links against musl rather than glibc. Always `false`
    /// outside Linux.
    pub musl: bool,
}

impl PlatformTarget {
    /// Detects the host platform from the compile-time target and, on Linux,
    /// the musl marker files.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionErrorKind::UnsupportedPlatform`] when the host has
    /// no published artifact.
    pub fn detect() -> AcquisitionResult<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH, || {
            MUSL_MARKERS.iter().any(|marker| Path::new(marker).exists())
        })
    }

    /// Builds a target from raw `std::env::consts` style identifiers.
    ///
    /// `probe_musl` runs only for Linux hosts with a supported architecture.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionErrorKind::UnsupportedPlatform`] for architectures
    /// other than x86-64 and ARM64, and for operating systems other than
    /// Windows, Linux, and macOS.
    pub fn from_parts(
        os: &str,
        arch: &str,
        probe_musl: impl FnOnce() -> bool,
    ) -> AcquisitionResult<Self> {
        let parsed_arch = match arch {
            "x86_64" => Arch::X64,
            "aarch64" => Arch::Arm64,
            other => {
                return Err(unsupported(format!(
                    "unsupported architecture '{other}'; only x64 and arm64 are supported"
                )));
            }
        };

        let parsed_os = match os {
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            "macos" => Os::MacOs,
            other => {
                return Err(unsupported(format!(
                    "unsupported operating system '{other}'; only Windows, Linux, and macOS are supported"
                )));
            }
        };

        let musl = parsed_os == Os::Linux && probe_musl();
        let target = Self {
            os: parsed_os,
            arch: parsed_arch,
            musl,
        };
        target.artifact_name()?;
        Ok(target)
    }

    /// Returns the release artifact filename for this platform.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionErrorKind::UnsupportedPlatform`] for Windows on
    /// ARM64, which has no published artifact.
    pub fn artifact_name(&self) -> AcquisitionResult<ArtifactName> {
        let arch = self.arch.identifier();
        let name = match (self.os, self.arch) {
            (Os::Windows, Arch::X64) => format!("{TOOL_NAME}-windows-{arch}.exe"),
            (Os::Windows, Arch::Arm64) => {
                return Err(unsupported(
                    "unsupported platform: Windows is only supported on x64".to_owned(),
                ));
            }
            (Os::Linux, _) if self.musl => format!("{TOOL_NAME}-linux-{arch}-musl"),
            (Os::Linux, _) => format!("{TOOL_NAME}-linux-{arch}"),
            (Os::MacOs, _) => format!("{TOOL_NAME}-macos-{arch}"),
        };
        Ok(ArtifactName(name))
    }
}

fn unsupported(message: String) -> AcquisitionError {
    AcquisitionError::new(AcquisitionErrorKind::UnsupportedPlatform, eyre!(message))
}

/// Filename of the platform-specific release artifact, such as
/// `tailwindcss-linux-x64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Wraps an artifact filename without validating it against the host.
    ///
    /// Intended for tests and callers that target a different platform.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the filename as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    fn name_for(os: &str, arch: &str, musl: bool) -> AcquisitionResult<String> {
        PlatformTarget::from_parts(os, arch, || musl)
            .and_then(|target| target.artifact_name())
            .map(|name| name.to_string())
    }

    #[rstest]
    #[case("windows", "x86_64", false, "tailwindcss-windows-x64.exe")]
    #[case("linux", "x86_64", false, "tailwindcss-linux-x64")]
    #[case("linux", "aarch64", false, "tailwindcss-linux-arm64")]
    #[case("linux", "x86_64", true, "tailwindcss-linux-x64-musl")]
    #[case("linux", "aarch64", true, "tailwindcss-linux-arm64-musl")]
    #[case("macos", "x86_64", false, "tailwindcss-macos-x64")]
    #[case("macos", "aarch64", true, "tailwindcss-macos-arm64")]
    fn supported_platforms_map_to_artifacts(
        #[case] os: &str,
        #[case] arch: &str,
        #[case] musl: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(name_for(os, arch, musl).expect("supported"), expected);
    }

    #[rstest]
    #[case("linux", "x86")]
    #[case("macos", "powerpc64")]
    #[case("freebsd", "x86_64")]
    #[case("windows", "aarch64")]
    fn unsupported_platforms_fail(#[case] os: &str, #[case] arch: &str) {
        let err = name_for(os, arch, false).expect_err("unsupported");
        assert_eq!(err.kind(), AcquisitionErrorKind::UnsupportedPlatform);
    }

    #[rstest]
    #[case("windows")]
    #[case("macos")]
    fn musl_probe_runs_only_on_linux(#[case] os: &str) {
        let probed = Cell::new(false);
        let _target = PlatformTarget::from_parts(os, "x86_64", || {
            probed.set(true);
            true
        });
        assert!(!probed.get());
    }

    #[test]
    fn detection_is_deterministic() {
        let first = PlatformTarget::detect().and_then(|target| target.artifact_name());
        for _ in 0..3 {
            let again = PlatformTarget::detect().and_then(|target| target.artifact_name());
            match (&first, &again) {
                (Ok(a), Ok(b)) => assert_eq!(a, b),
                (Err(a), Err(b)) => assert_eq!(a.kind(), b.kind()),
                _ => panic!("detection changed between calls"),
            }
        }
    }
}
