//! Runs an installed Tailwind CSS binary and relays its output.
//!
//! Both output streams are drained concurrently into the log and must reach
//! end-of-file before the exit status is inspected, so no trailing output is
//! lost. Cancelling the token kills the child; that is the normal way to
//! leave watch mode.

use std::ffi::OsString;
use std::process::Stdio;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{Context, eyre};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{ProcessError, ProcessResult};
use crate::observability::PROCESS_TARGET;

/// Arguments for one `build` or `watch` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailwindInvocation {
    /// Input stylesheet.
    pub input: Utf8PathBuf,
    /// Output stylesheet.
    pub output: Utf8PathBuf,
    /// Pass `--minify`.
    pub minify: bool,
    /// Pass `--watch` and keep running until cancelled.
    pub watch: bool,
}

impl TailwindInvocation {
    /// Returns the command-line arguments for the Tailwind CSS binary.
    ///
    /// # Examples
    ///
    /// ```
    /// use tailwind_tool::TailwindInvocation;
    ///
    /// let invocation = TailwindInvocation {
    ///     input: "app.css".into(),
    ///     output: "wwwroot/app.css".into(),
    ///     minify: true,
    ///     watch: false,
    /// };
    /// assert_eq!(
    ///     invocation.args(),
    ///     ["-i", "app.css", "-o", "wwwroot/app.css", "--minify"],
    /// );
    /// ```
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-i"),
            OsString::from(self.input.as_str()),
            OsString::from("-o"),
            OsString::from(self.output.as_str()),
        ];
        if self.minify {
            args.push(OsString::from("--minify"));
        }
        if self.watch {
            args.push(OsString::from("--watch"));
        }
        args
    }
}

/// Runs `binary` with `invocation` in the current directory.
///
/// Returns once the process exits, or after killing it when `cancel` fires.
///
/// # Errors
///
/// Returns a [`ProcessError`] when the binary cannot be spawned, its output
/// cannot be read, or it exits unsuccessfully.
pub async fn run_tailwind(
    binary: &Utf8Path,
    invocation: &TailwindInvocation,
    cancel: &CancellationToken,
) -> ProcessResult<()> {
    debug!(
        target: PROCESS_TARGET,
        binary = %binary,
        args = ?invocation.args(),
        "starting Tailwind CSS"
    );

    let mut child = Command::new(binary.as_std_path())
        .args(invocation.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start {binary}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| eyre!("standard output of {binary} was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| eyre!("standard error of {binary} was not captured"))?;

    let drained = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        relayed = async { tokio::join!(relay_lines(stdout), relay_lines(stderr)) } => Some(relayed),
    };
    let Some((stdout_lines, stderr_lines)) = drained else {
        return stop(&mut child).await;
    };
    stdout_lines.context("failed to read Tailwind CSS standard output")?;
    stderr_lines.context("failed to read Tailwind CSS standard error")?;

    let exited = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        status = child.wait() => Some(status),
    };
    let Some(waited) = exited else {
        return stop(&mut child).await;
    };
    let status = waited.context("failed to wait for Tailwind CSS")?;

    if status.success() {
        debug!(target: PROCESS_TARGET, %status, "Tailwind CSS exited");
        Ok(())
    } else {
        Err(ProcessError::from(eyre!("Tailwind CSS exited with {status}")))
    }
}

async fn stop(child: &mut Child) -> ProcessResult<()> {
    child
        .kill()
        .await
        .context("failed to stop Tailwind CSS")?;
    info!(target: PROCESS_TARGET, "Tailwind CSS stopped.");
    Ok(())
}

/// Logs each non-blank line of `reader` and returns how many were logged.
async fn relay_lines(reader: impl AsyncRead + Unpin) -> std::io::Result<usize> {
    let mut segments = BufReader::new(reader).split(b'\n');
    let mut relayed = 0;
    while let Some(segment) = segments.next_segment().await? {
        let decoded = String::from_utf8_lossy(&segment);
        let line = decoded.trim_end();
        if line.trim_start().is_empty() {
            continue;
        }
        info!(target: PROCESS_TARGET, "Tailwind CSS: {line}");
        relayed += 1;
    }
    Ok(relayed)
}
