use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Launch settings for the local process-backed cluster runtime.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DaemonConfig {
    /// Master daemon binary, resolved via PATH if not absolute
    #[serde(default = "default_master_binary")]
    pub master_binary: PathBuf,

    /// Worker daemon binary, resolved via PATH if not absolute
    #[serde(default = "default_worker_binary")]
    pub worker_binary: PathBuf,

    /// Host every daemon binds to
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Root directory for per-daemon data directories
    #[serde(default = "default_data_root_dir")]
    pub data_root_dir: PathBuf,

    /// Directory for per-daemon stdout/stderr capture
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// How long a daemon may run before an exit no longer aborts the start
    #[serde(default = "default_startup_grace_ms")]
    pub startup_grace_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            master_binary: default_master_binary(),
            worker_binary: default_worker_binary(),
            bind_host: default_bind_host(),
            data_root_dir: default_data_root_dir(),
            log_dir: default_log_dir(),
            startup_grace_ms: default_startup_grace_ms(),
        }
    }
}

impl DaemonConfig {
    /// Validates daemon launch configuration
    /// # Errors
    /// Returns `Error::InvalidConfig` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        if self.master_binary.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("master_binary path cannot be empty".into()));
        }

        if self.worker_binary.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("worker_binary path cannot be empty".into()));
        }

        if self.bind_host.is_empty() {
            return Err(Error::InvalidConfig("bind_host cannot be empty".into()));
        }

        self.validate_directory(&self.data_root_dir, "data_root_dir")?;
        self.validate_directory(&self.log_dir, "log_dir")?;

        Ok(())
    }

    /// Ensures directory path is valid and writable
    fn validate_directory(
        &self,
        path: &PathBuf,
        name: &str,
    ) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(format!("{} path cannot be empty", name)));
        }

        #[cfg(not(test))]
        {
            use std::fs;
            // Check directory existence or create ability
            if !path.exists() {
                fs::create_dir_all(path).map_err(|e| {
                    Error::InvalidConfig(format!(
                        "Failed to create {} directory at {}: {}",
                        name,
                        path.display(),
                        e
                    ))
                })?;
            }

            // Check write permissions
            let test_file = path.join(".permission_test");
            fs::write(&test_file, b"test").map_err(|e| {
                Error::InvalidConfig(format!(
                    "No write permission in {} directory {}: {}",
                    name,
                    path.display(),
                    e
                ))
            })?;
            fs::remove_file(&test_file).ok();
        }

        Ok(())
    }
}

fn default_master_binary() -> PathBuf {
    PathBuf::from("cluster-master")
}
fn default_worker_binary() -> PathBuf {
    PathBuf::from("cluster-worker")
}
fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}
fn default_data_root_dir() -> PathBuf {
    PathBuf::from("/tmp/minicluster/data")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp/minicluster/logs")
}
// in ms
fn default_startup_grace_ms() -> u64 {
    100
}
