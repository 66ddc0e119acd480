use std::time::Duration;

use mockall::Sequence;

use super::await_workers;
use crate::ClusterHandle;
use crate::Error;
use crate::HostPort;
use crate::MockClusterRuntime;

fn gate_handle() -> ClusterHandle {
    ClusterHandle::new(
        "gate-test",
        vec![HostPort::new("127.0.0.1", 7100)],
        vec![
            HostPort::new("127.0.0.1", 9100),
            HostPort::new("127.0.0.1", 9101),
            HostPort::new("127.0.0.1", 9102),
        ],
    )
}

#[tokio::test(start_paused = true)]
async fn returns_true_once_count_first_reaches_target() {
    let mut runtime = MockClusterRuntime::new();
    let mut seq = Sequence::new();
    // times(1) on each step: reaching the target must stop the polling
    for count in [0usize, 1, 2, 3] {
        runtime
            .expect_healthy_workers()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(count));
    }

    let handle = gate_handle();
    let ready = await_workers(
        &runtime,
        &handle,
        3,
        Duration::from_secs(50),
        Duration::from_millis(500),
    )
    .await;

    assert!(ready);
}

#[tokio::test(start_paused = true)]
async fn returns_false_once_timeout_elapses() {
    let mut runtime = MockClusterRuntime::new();
    runtime.expect_healthy_workers().returning(|_| Ok(1));

    let handle = gate_handle();
    let started = tokio::time::Instant::now();
    let ready = await_workers(
        &runtime,
        &handle,
        3,
        Duration::from_millis(2_000),
        Duration::from_millis(500),
    )
    .await;

    assert!(!ready);
    // hard bound: the timeout plus at most one poll interval of slack
    assert!(started.elapsed() <= Duration::from_millis(2_500));
}

#[tokio::test(start_paused = true)]
async fn keeps_polling_through_probe_errors() {
    let mut runtime = MockClusterRuntime::new();
    let mut seq = Sequence::new();
    runtime
        .expect_healthy_workers()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_| Err(Error::Fatal("probe failed".to_string())));
    runtime
        .expect_healthy_workers()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(3));

    let handle = gate_handle();
    let ready = await_workers(
        &runtime,
        &handle,
        3,
        Duration::from_secs(50),
        Duration::from_millis(500),
    )
    .await;

    assert!(ready);
}

#[tokio::test(start_paused = true)]
async fn an_expired_wait_polls_no_further() {
    let mut runtime = MockClusterRuntime::new();
    // 0ms, 500ms, 1000ms: three polls fit strictly inside the 1200ms bound
    runtime.expect_healthy_workers().times(3).returning(|_| Ok(0));

    let handle = gate_handle();
    let ready = await_workers(
        &runtime,
        &handle,
        3,
        Duration::from_millis(1_200),
        Duration::from_millis(500),
    )
    .await;

    assert!(!ready);
}
