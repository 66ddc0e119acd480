//! Local process-backed cluster runtime.
//!
//! Spawns every master and worker as a child process of the test run, tags
//! each with the configured label so stuck daemons can be traced back to the
//! test class that started them, and probes worker health over TCP. Daemon
//! stdout/stderr land in per-daemon log files under the configured log
//! directory.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::process::Child;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ClusterHandle;
use super::ClusterRuntime;
use super::HostPort;
use crate::utils::file_io::open_file_for_append;
use crate::utils::net::get_available_ports;
use crate::utils::net::is_server_ready;
use crate::ClusterConfig;
use crate::DaemonConfig;
use crate::Result;
use crate::StartupError;
use crate::TeardownError;

pub(crate) const MASTER_ROLE: &str = "master";
pub(crate) const WORKER_ROLE: &str = "worker";

/// One spawned daemon of a live cluster
struct DaemonProcess {
    role: &'static str,
    address: HostPort,
    child: Child,
}

/// Default [`ClusterRuntime`]: masters and workers as local child processes.
pub struct LocalProcessRuntime {
    daemon_config: DaemonConfig,
    /// Daemons per cluster id. An entry exists exactly while the cluster is
    /// considered live by this runtime.
    clusters: DashMap<String, Vec<DaemonProcess>>,
}

impl LocalProcessRuntime {
    pub fn new(daemon_config: DaemonConfig) -> Self {
        Self {
            daemon_config,
            clusters: DashMap::new(),
        }
    }

    fn spawn_daemon(
        &self,
        role: &'static str,
        index: usize,
        address: &HostPort,
        master_csv: &str,
        cluster_id: &str,
        config: &ClusterConfig,
    ) -> std::result::Result<Child, StartupError> {
        let (binary, extra_args) = match role {
            MASTER_ROLE => (&self.daemon_config.master_binary, &config.master_args),
            _ => (&self.daemon_config.worker_binary, &config.worker_args),
        };

        let data_dir = self
            .daemon_config
            .data_root_dir
            .join(cluster_id)
            .join(format!("{}-{}", role, index));
        std::fs::create_dir_all(&data_dir).map_err(|source| StartupError::DataDir {
            role,
            path: data_dir.clone(),
            source,
        })?;

        let log_path = self
            .daemon_config
            .log_dir
            .join(cluster_id)
            .join(format!("{}-{}.log", role, index));
        let stdout_log = open_file_for_append(&log_path).map_err(|source| StartupError::LogCapture {
            path: log_path.clone(),
            source,
        })?;
        let stderr_log = stdout_log.try_clone().map_err(|source| StartupError::LogCapture {
            path: log_path.clone(),
            source,
        })?;

        let mut command = Command::new(binary);
        command
            .arg(format!("--bind_address={}", address))
            .arg(format!("--master_addresses={}", master_csv))
            .arg(format!("--data_dir={}", data_dir.display()))
            .arg(format!("--label={}", config.label))
            .args(extra_args.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_log))
            .stderr(Stdio::from(stderr_log))
            .kill_on_drop(true);

        debug!("spawning {} daemon at {}: {:?}", role, address, command);
        command.spawn().map_err(|source| StartupError::Spawn {
            role,
            binary: binary.clone(),
            source,
        })
    }

    async fn kill_daemon(daemon: &mut DaemonProcess) -> std::result::Result<(), TeardownError> {
        // A daemon that already exited has nothing left to kill
        if matches!(daemon.child.try_wait(), Ok(Some(_))) {
            return Ok(());
        }

        let pid = daemon.child.id();
        daemon.child.kill().await.map_err(|source| TeardownError::Kill {
            role: daemon.role,
            pid,
            source,
        })
    }

    /// Best-effort cleanup of a partially started cluster
    async fn kill_all(daemons: &mut Vec<DaemonProcess>) {
        for daemon in daemons.iter_mut() {
            if let Err(e) = Self::kill_daemon(daemon).await {
                warn!("cleanup after aborted start failed: {:?}", e);
            }
        }
    }
}

#[async_trait]
impl ClusterRuntime for LocalProcessRuntime {
    async fn start(
        &self,
        config: &ClusterConfig,
    ) -> Result<ClusterHandle> {
        let cluster_id = nanoid::nanoid!(10);

        let master_ports = get_available_ports(config.master_count).map_err(StartupError::PortAllocation)?;
        let worker_ports = get_available_ports(config.worker_count).map_err(StartupError::PortAllocation)?;

        let masters: Vec<HostPort> = master_ports
            .into_iter()
            .map(|port| HostPort::new(self.daemon_config.bind_host.clone(), port))
            .collect();
        let workers: Vec<HostPort> = worker_ports
            .into_iter()
            .map(|port| HostPort::new(self.daemon_config.bind_host.clone(), port))
            .collect();
        let master_csv = masters.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");

        info!(
            "starting cluster {}: {} masters, {} workers, label {:?}",
            cluster_id, config.master_count, config.worker_count, config.label
        );

        let mut daemons: Vec<DaemonProcess> = Vec::with_capacity(masters.len() + workers.len());
        let spawn_plan = masters
            .iter()
            .map(|addr| (MASTER_ROLE, addr))
            .chain(workers.iter().map(|addr| (WORKER_ROLE, addr)));
        for (index, (role, address)) in spawn_plan.enumerate() {
            let position = if role == MASTER_ROLE { index } else { index - masters.len() };
            match self.spawn_daemon(role, position, address, &master_csv, &cluster_id, config) {
                Ok(child) => daemons.push(DaemonProcess {
                    role,
                    address: address.clone(),
                    child,
                }),
                Err(e) => {
                    Self::kill_all(&mut daemons).await;
                    return Err(e.into());
                }
            }
        }

        // A daemon that dies this early (bad flag, missing dependency, port
        // race) would otherwise surface much later as a readiness timeout.
        sleep(Duration::from_millis(self.daemon_config.startup_grace_ms)).await;
        let mut early_exit: Option<(&'static str, String)> = None;
        for daemon in daemons.iter_mut() {
            if let Ok(Some(status)) = daemon.child.try_wait() {
                early_exit = Some((daemon.role, format!("{} exited with {}", daemon.address, status)));
                break;
            }
        }
        if let Some((role, details)) = early_exit {
            warn!("aborting partial start of cluster {}: {}", cluster_id, details);
            Self::kill_all(&mut daemons).await;
            return Err(StartupError::EarlyExit { role, details }.into());
        }

        self.clusters.insert(cluster_id.clone(), daemons);
        Ok(ClusterHandle::new(cluster_id, masters, workers))
    }

    async fn healthy_workers(
        &self,
        handle: &ClusterHandle,
    ) -> Result<usize> {
        let mut healthy = 0;
        for worker in handle.worker_addresses() {
            if is_server_ready(&worker.to_string()).await {
                healthy += 1;
            }
        }

        debug!(
            "cluster {}: {}/{} workers healthy",
            handle.cluster_id(),
            healthy,
            handle.worker_addresses().len()
        );
        Ok(healthy)
    }

    async fn shutdown(
        &self,
        handle: &ClusterHandle,
    ) -> Result<()> {
        let (_, mut daemons) = match self.clusters.remove(handle.cluster_id()) {
            Some(entry) => entry,
            None => return Err(TeardownError::UnknownHandle(handle.cluster_id().to_string()).into()),
        };

        info!("stopping cluster {} ({} daemons)", handle.cluster_id(), daemons.len());
        let mut first_failure: Option<TeardownError> = None;
        for daemon in daemons.iter_mut() {
            if let Err(e) = Self::kill_daemon(daemon).await {
                warn!("failed to stop {} daemon at {}: {:?}", daemon.role, daemon.address, e);
                if first_failure.is_none() {
                    first_failure = Some(e);
                }
            }
        }

        match first_failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
