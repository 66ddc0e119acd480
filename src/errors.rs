//! Mini-Cluster Harness Error Hierarchy
//!
//! Defines error types for the test-cluster lifecycle manager, categorized by
//! lifecycle phase: startup failures abort a test's setup and leave no
//! cluster behind, readiness timeouts keep the started cluster alive for
//! inspection, and teardown failures are logged and suppressed so they never
//! mask the original test outcome.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cluster processes failed to come up
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// Workers never reached the expected healthy count within the timeout
    #[error("cluster readiness check failed: expected {expected} healthy workers within {timeout_ms}ms")]
    ReadinessTimeout { expected: usize, timeout_ms: u64 },

    /// Harness configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Harness configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Post-ready hook failures, surfaced as-is to the test
    #[error("post-ready hook failed: {0}")]
    ReadyHook(String),

    /// Best-effort teardown failures. Callers of `destroy()` never see these.
    #[error(transparent)]
    Teardown(#[from] TeardownError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Daemon binary could not be launched
    #[error("failed to spawn {role} daemon from {binary:?}: {source}")]
    Spawn {
        role: &'static str,
        binary: PathBuf,
        source: std::io::Error,
    },

    /// Daemon exited within the startup grace window
    #[error("{role} daemon exited during startup: {details}")]
    EarlyExit { role: &'static str, details: String },

    /// No free local port could be reserved for a daemon
    #[error("failed to allocate a free port: {0}")]
    PortAllocation(#[from] std::io::Error),

    /// Per-daemon data directory could not be prepared
    #[error("failed to prepare {role} data directory {path:?}: {source}")]
    DataDir {
        role: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Daemon log file could not be opened
    #[error("failed to open daemon log file {path:?}: {source}")]
    LogCapture { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum TeardownError {
    /// Daemon process could not be killed
    #[error("failed to kill {role} daemon (pid {pid:?}): {source}")]
    Kill {
        role: &'static str,
        pid: Option<u32>,
        source: std::io::Error,
    },

    /// Shutdown was requested for a cluster this runtime does not own
    #[error("unknown cluster handle: {0}")]
    UnknownHandle(String),
}
