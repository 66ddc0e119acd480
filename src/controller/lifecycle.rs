//! Shared-lifecycle controller for the test cluster.
//!
//! Holds the process-wide slot with at most one live cluster. A test class
//! calls [`LifecycleController::ensure_running`] before every test (the
//! first call starts a cluster, later calls reuse it) and
//! [`LifecycleController::final_teardown`] once, unconditionally, as the
//! class's last action. A test may also destroy the cluster early via
//! [`LifecycleController::destroy`]; the next setup then starts a fresh one.
//!
//! Slot transitions: absent -> starting -> running -> absent on destroy,
//! with starting -> absent when startup fails. A cluster that failed the
//! readiness gate stays running so its logs and state remain inspectable;
//! only an explicit destroy rolls it back.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::await_workers;
use crate::ClusterConfig;
use crate::ClusterHandle;
use crate::ClusterRuntime;
use crate::Error;
use crate::HostPort;
use crate::Result;

/// Callback invoked once per fresh cluster start, after the readiness gate
/// passes. Class-specific post-start setup (creating tables, seeding data)
/// goes here; errors abort the current setup call but leave the cluster up.
pub type ReadyHook = Box<dyn for<'a> Fn(&'a ClusterHandle) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// A live cluster occupying the shared slot
struct LiveCluster {
    handle: ClusterHandle,
    master_addresses: Vec<HostPort>,
}

/// Owns the shared cluster-state slot and drives setup/teardown around it.
pub struct LifecycleController {
    runtime: Arc<dyn ClusterRuntime>,
    config: ClusterConfig,
    /// At most one live cluster. The lock is held for the whole of a
    /// setup/teardown operation, so concurrent test runners serialize here.
    slot: Mutex<Option<LiveCluster>>,
    ready_hook: Option<ReadyHook>,
}

impl LifecycleController {
    pub fn new(
        runtime: Arc<dyn ClusterRuntime>,
        config: ClusterConfig,
    ) -> Self {
        Self {
            runtime,
            config,
            slot: Mutex::new(None),
            ready_hook: None,
        }
    }

    /// Registers the post-ready hook
    pub fn with_ready_hook(
        mut self,
        hook: ReadyHook,
    ) -> Self {
        self.ready_hook = Some(hook);
        self
    }

    /// Makes sure a cluster is up before a test runs.
    ///
    /// A populated slot is reused verbatim; the stored configuration is not
    /// consulted again until the cluster is destroyed. With an empty slot a
    /// fresh cluster is started and gated on worker readiness:
    /// - startup failure leaves the slot empty, so the next call retries a
    ///   fresh start;
    /// - a readiness timeout or a hook failure is a hard error, but the
    ///   started cluster stays in the slot until an explicit destroy.
    pub async fn ensure_running(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            debug!("cluster already running, reusing it");
            return Ok(());
        }

        info!("starting cluster for {:?}", self.config.label);
        let handle = self.runtime.start(&self.config).await?;
        let master_addresses = handle.master_addresses().to_vec();
        *slot = Some(LiveCluster {
            handle: handle.clone(),
            master_addresses,
        });

        info!("Waiting for workers...");
        let expected = self.config.worker_count;
        let timeout_ms = self.config.operation_timeout_ms;
        let ready = await_workers(
            self.runtime.as_ref(),
            &handle,
            expected,
            Duration::from_millis(timeout_ms),
            Duration::from_millis(self.config.readiness_poll_interval_ms),
        )
        .await;
        if !ready {
            return Err(Error::ReadinessTimeout { expected, timeout_ms });
        }

        if let Some(hook) = &self.ready_hook {
            hook(&handle).await?;
        }

        Ok(())
    }

    /// Tears the cluster down, idempotently.
    ///
    /// An empty slot is a no-op with no runtime interaction. Otherwise the
    /// slot is cleared unconditionally (address accessors go empty even if
    /// shutdown fails) and shutdown errors are logged and suppressed so a
    /// best-effort teardown never masks the original test outcome.
    pub async fn destroy(&self) {
        let mut slot = self.slot.lock().await;
        let live = match slot.take() {
            Some(live) => live,
            None => return,
        };

        info!("Destroying cluster {}", live.handle.cluster_id());
        if let Err(e) = self.runtime.shutdown(&live.handle).await {
            error!("cluster shutdown failed: {:?}", e);
        }
    }

    /// Runs once as the last action of a test class, regardless of how its
    /// tests fared. Delegates to [`destroy`](Self::destroy).
    pub async fn final_teardown(&self) {
        info!("final_teardown is running");
        self.destroy().await;
    }

    pub async fn is_running(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Comma-joined master addresses of the live cluster, `None` when absent
    pub async fn master_addresses(&self) -> Option<String> {
        self.slot.lock().await.as_ref().map(|live| {
            live.master_addresses
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
    }

    /// Structured master address list of the live cluster, empty when absent
    pub async fn master_host_ports(&self) -> Vec<HostPort> {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|live| live.master_addresses.clone())
            .unwrap_or_default()
    }
}
