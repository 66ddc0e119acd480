use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A `host:port` endpoint of a cluster daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for HostPort {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opaque reference to a live cluster, returned by
/// [`ClusterRuntime::start`](crate::ClusterRuntime::start).
///
/// Carries the derived master address list tests connect to, and the worker
/// address list the runtime probes for health. Invalid once `shutdown` has
/// been called against it.
#[derive(Debug, Clone)]
pub struct ClusterHandle {
    cluster_id: String,
    master_addresses: Vec<HostPort>,
    worker_addresses: Vec<HostPort>,
}

impl ClusterHandle {
    pub fn new(
        cluster_id: impl Into<String>,
        master_addresses: Vec<HostPort>,
        worker_addresses: Vec<HostPort>,
    ) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            master_addresses,
            worker_addresses,
        }
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    /// Ordered master endpoints, as allocated at start
    pub fn master_addresses(&self) -> &[HostPort] {
        &self.master_addresses
    }

    /// Ordered worker endpoints, as allocated at start
    pub fn worker_addresses(&self) -> &[HostPort] {
        &self.worker_addresses
    }

    /// Comma-joined master list, e.g. `127.0.0.1:7100,127.0.0.1:7101`
    pub fn master_addresses_csv(&self) -> String {
        self.master_addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
