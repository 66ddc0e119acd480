use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use minicluster::ClusterConfig;
use minicluster::ClusterHandle;
use minicluster::ClusterRuntime;
use minicluster::HostPort;
use minicluster::Result;
use minicluster::StartupError;
use parking_lot::Mutex;

/// Scripted in-process stand-in for a real cluster runtime.
///
/// `healthy_workers` walks the health script one entry per poll and repeats
/// the last entry forever, so a script like `[0, 1, 2, 3]` simulates workers
/// coming up one by one.
pub struct FakeRuntime {
    health_script: Mutex<VecDeque<usize>>,
    fail_next_start: AtomicBool,
    start_calls: AtomicUsize,
    shutdown_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRuntime {
    pub fn with_health_script(script: &[usize]) -> Self {
        Self {
            health_script: Mutex::new(script.iter().copied().collect()),
            fail_next_start: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
        }
    }

    /// Same as [`with_health_script`](Self::with_health_script), but the
    /// first `start` call fails before any process comes up
    pub fn failing_first_start(script: &[usize]) -> Self {
        let runtime = Self::with_health_script(script);
        runtime.fail_next_start.store(true, Ordering::SeqCst);
        runtime
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterRuntime for FakeRuntime {
    async fn start(
        &self,
        config: &ClusterConfig,
    ) -> Result<ClusterHandle> {
        let attempt = self.start_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(StartupError::EarlyExit {
                role: "master",
                details: "127.0.0.1:7100 exited with exit status: 1".to_string(),
            }
            .into());
        }

        let masters = (0..config.master_count)
            .map(|i| HostPort::new("127.0.0.1", 7100 + i as u16))
            .collect();
        let workers = (0..config.worker_count)
            .map(|i| HostPort::new("127.0.0.1", 9100 + i as u16))
            .collect();
        Ok(ClusterHandle::new(format!("fake-{}", attempt), masters, workers))
    }

    async fn healthy_workers(
        &self,
        _handle: &ClusterHandle,
    ) -> Result<usize> {
        let mut script = self.health_script.lock();
        let count = if script.len() > 1 {
            script.pop_front().unwrap_or(0)
        } else {
            script.front().copied().unwrap_or(0)
        };
        Ok(count)
    }

    async fn shutdown(
        &self,
        _handle: &ClusterHandle,
    ) -> Result<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
