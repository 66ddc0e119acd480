use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Shape of the test cluster a single test class shares.
///
/// Frozen once the cluster has started: `ensure_running` ignores the
/// configuration entirely while a cluster is live, so overrides (extra
/// daemon args in particular) must be applied before the first setup call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Number of master processes to start
    #[serde(default = "default_master_count")]
    pub master_count: usize,

    /// Number of worker processes to start
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Upper bound for blocking harness operations, readiness wait included
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Interval between readiness polls. Must stay sub-second.
    #[serde(default = "default_readiness_poll_interval_ms")]
    pub readiness_poll_interval_ms: u64,

    /// Diagnostic tag passed to every spawned daemon, typically the invoking
    /// test class name. Helps identify stuck processes.
    #[serde(default)]
    pub label: String,

    /// Extra command-line arguments applied verbatim to every master
    #[serde(default)]
    pub master_args: Vec<String>,

    /// Extra command-line arguments applied verbatim to every worker
    #[serde(default)]
    pub worker_args: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            master_count: default_master_count(),
            worker_count: default_worker_count(),
            operation_timeout_ms: default_operation_timeout_ms(),
            readiness_poll_interval_ms: default_readiness_poll_interval_ms(),
            label: String::new(),
            master_args: vec![],
            worker_args: vec![],
        }
    }
}

impl ClusterConfig {
    /// Sets the diagnostic label, typically the invoking test class name
    pub fn with_label(
        mut self,
        label: impl Into<String>,
    ) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_master_count(
        mut self,
        master_count: usize,
    ) -> Self {
        self.master_count = master_count;
        self
    }

    pub fn with_operation_timeout_ms(
        mut self,
        timeout_ms: u64,
    ) -> Self {
        self.operation_timeout_ms = timeout_ms;
        self
    }

    /// Replaces the extra master arguments, applied in order at spawn time
    pub fn with_master_args(
        mut self,
        args: Vec<String>,
    ) -> Self {
        self.master_args = args;
        self
    }

    /// Replaces the extra worker arguments, applied in order at spawn time
    pub fn with_worker_args(
        mut self,
        args: Vec<String>,
    ) -> Self {
        self.worker_args = args;
        self
    }

    /// Validates cluster shape consistency
    /// # Errors
    /// Returns `Error::InvalidConfig` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        if self.master_count == 0 {
            return Err(Error::InvalidConfig("master_count must be at least 1".into()));
        }

        if self.worker_count == 0 {
            return Err(Error::InvalidConfig("worker_count must be at least 1".into()));
        }

        if self.operation_timeout_ms == 0 {
            return Err(Error::InvalidConfig("operation_timeout_ms must be at least 1ms".into()));
        }

        // The readiness gate relies on a sub-second cadence so the timeout
        // bound is honored with at most one interval of slack.
        if self.readiness_poll_interval_ms == 0 || self.readiness_poll_interval_ms > 1000 {
            return Err(Error::InvalidConfig(format!(
                "readiness_poll_interval_ms must be within (0, 1000], got {}",
                self.readiness_poll_interval_ms
            )));
        }

        Ok(())
    }
}

fn default_master_count() -> usize {
    3
}
fn default_worker_count() -> usize {
    3
}
// in ms
fn default_operation_timeout_ms() -> u64 {
    50_000
}
fn default_readiness_poll_interval_ms() -> u64 {
    500
}
