use std::time::Duration;

use tokio::time::sleep;
use tokio::time::Instant;
use tracing::debug;
use tracing::warn;

use crate::ClusterHandle;
use crate::ClusterRuntime;

/// Waits until `expected_count` workers of the cluster are healthy.
///
/// Polls the runtime at the fixed `poll_interval` cadence, checking the
/// elapsed wall-clock time against `timeout` at the top of every iteration:
/// the timeout is a hard upper bound on blocking, never exceeded by more
/// than one interval of slack. Returns `true` as soon as the latest poll
/// reports at least `expected_count` healthy workers, with no further
/// polling afterwards; returns `false` on expiry. A flapping worker only
/// counts through the latest poll (no hysteresis), and there are no retries
/// after a `false`: the caller decides whether to continue or tear down.
///
/// A failed probe is not a failed wait: it is logged and the loop keeps
/// polling until the timeout settles the question.
pub async fn await_workers(
    runtime: &dyn ClusterRuntime,
    handle: &ClusterHandle,
    expected_count: usize,
    timeout: Duration,
    poll_interval: Duration,
) -> bool {
    let started = Instant::now();

    loop {
        if started.elapsed() > timeout {
            warn!(
                "cluster {} readiness wait expired after {:?}",
                handle.cluster_id(),
                timeout
            );
            return false;
        }

        match runtime.healthy_workers(handle).await {
            Ok(count) if count >= expected_count => {
                debug!("{}/{} workers healthy", count, expected_count);
                return true;
            }
            Ok(count) => {
                debug!("{}/{} workers healthy, polling again", count, expected_count);
            }
            Err(e) => {
                warn!("worker health probe failed: {:?}", e);
            }
        }

        sleep(poll_interval).await;
    }
}
