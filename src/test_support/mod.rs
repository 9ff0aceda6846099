//! Internal helpers re-exported for integration tests.

mod logging;

pub use logging::capture_warn_logs;
