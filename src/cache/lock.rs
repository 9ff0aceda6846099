//! Cross-process file locking for cache writes.
//!
//! Serialises downloads of the same release tag across processes. On Unix
//! systems this uses `flock(2)` advisory locks; elsewhere locking is a no-op
//! and callers must uphold a single-writer assumption.

use camino::Utf8Path;
use std::fs::{File, OpenOptions};
use std::io;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Subdirectory within the binaries directory for lock files.
pub(crate) const LOCKS_SUBDIR: &str = ".locks";

/// Guard that holds a file lock until dropped.
#[derive(Debug)]
pub struct CacheLock {
    _file: File,
}

impl CacheLock {
    /// Takes the download lock for `key`, blocking while another process
    /// holds it.
    ///
    /// ```no_run
    /// use camino::Utf8Path;
    /// use tailwind_tool::cache::CacheLock;
    ///
    /// let _lock = CacheLock::acquire_exclusive(Utf8Path::new("/tmp/tailwind-binaries"), "v4.0.0")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or locked.
    #[cfg(unix)]
    pub fn acquire_exclusive(binaries_dir: &Utf8Path, key: &str) -> io::Result<Self> {
        let file = open_lock_file(binaries_dir, key)?;

        // SAFETY: The descriptor comes from `file`, which stays owned by this
        // scope until after `flock` returns.
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { _file: file })
    }

    /// Takes the download lock for `key`. Only the lock file is opened here;
    /// nothing is locked.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened.
    #[cfg(not(unix))]
    pub fn acquire_exclusive(binaries_dir: &Utf8Path, key: &str) -> io::Result<Self> {
        let file = open_lock_file(binaries_dir, key)?;
        Ok(Self { _file: file })
    }
}

fn open_lock_file(binaries_dir: &Utf8Path, key: &str) -> io::Result<File> {
    let locks_dir = binaries_dir.join(LOCKS_SUBDIR);
    std::fs::create_dir_all(&locks_dir)?;

    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(locks_dir.join(format!("{key}.lock")))
}
