//! Cluster runtime boundary.
//!
//! The Lifecycle Controller only ever talks to a [`ClusterRuntime`]: the
//! collaborator that actually spawns master/worker processes and reports
//! their health. [`LocalProcessRuntime`] is the default implementation,
//! backed by local child processes.
mod handle;
mod local;
pub use handle::*;
pub use local::*;


use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::ClusterConfig;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterRuntime: Send + Sync + 'static {
    /// Brings up the configured master and worker processes.
    ///
    /// Either every process is running when this returns, or none is: a
    /// partial start is aborted and reported as a [`crate::StartupError`].
    async fn start(
        &self,
        config: &ClusterConfig,
    ) -> Result<ClusterHandle>;

    /// Number of workers currently observed healthy.
    ///
    /// Queried repeatedly by the readiness gate. A returned error means the
    /// probe itself failed, not that zero workers are healthy.
    async fn healthy_workers(
        &self,
        handle: &ClusterHandle,
    ) -> Result<usize>;

    /// Stops every process belonging to `handle`.
    ///
    /// The handle is invalid afterwards.
    async fn shutdown(
        &self,
        handle: &ClusterHandle,
    ) -> Result<()>;
}
