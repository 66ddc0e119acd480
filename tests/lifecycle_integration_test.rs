//! End-to-end lifecycle scenarios against a scripted runtime: one cluster
//! shared across a class's tests, gated on readiness, always torn down.
mod common;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::FakeRuntime;
use minicluster::ClusterConfig;
use minicluster::Error;
use minicluster::LifecycleController;

fn test_cluster_config() -> ClusterConfig {
    let mut config = ClusterConfig::default()
        .with_label("minicluster::lifecycle_integration_test")
        .with_operation_timeout_ms(300);
    config.readiness_poll_interval_ms = 10;
    config
}

#[tokio::test]
async fn cluster_is_started_once_and_torn_down_at_class_end() {
    let runtime = Arc::new(FakeRuntime::with_health_script(&[3]));
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let hook_calls_inner = hook_calls.clone();
    let controller = LifecycleController::new(runtime.clone(), test_cluster_config())
        .with_ready_hook(Box::new(move |_handle| {
            let calls = hook_calls_inner.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }));

    // three tests of the same class share one cluster
    for _ in 0..3 {
        controller.ensure_running().await.expect("setup should succeed");
    }
    assert_eq!(runtime.start_calls(), 1);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        controller.master_addresses().await.as_deref(),
        Some("127.0.0.1:7100,127.0.0.1:7101,127.0.0.1:7102")
    );
    assert_eq!(controller.master_host_ports().await.len(), 3);

    controller.final_teardown().await;
    assert_eq!(runtime.shutdown_calls(), 1);
    assert!(controller.master_addresses().await.is_none());

    // tearing down an already clean class performs no runtime calls
    controller.final_teardown().await;
    assert_eq!(runtime.shutdown_calls(), 1);
}

#[tokio::test]
async fn destroying_mid_class_starts_a_fresh_cluster_for_the_next_test() {
    let runtime = Arc::new(FakeRuntime::with_health_script(&[3]));
    let controller = LifecycleController::new(runtime.clone(), test_cluster_config());

    controller.ensure_running().await.unwrap();
    controller.destroy().await;
    controller.ensure_running().await.unwrap();

    assert_eq!(runtime.start_calls(), 2);
    assert_eq!(runtime.shutdown_calls(), 1);

    controller.final_teardown().await;
    assert_eq!(runtime.shutdown_calls(), 2);
}

#[tokio::test]
async fn workers_becoming_healthy_gradually_still_pass_the_gate() {
    let runtime = Arc::new(FakeRuntime::with_health_script(&[0, 1, 2, 3]));
    let controller = LifecycleController::new(runtime.clone(), test_cluster_config());

    controller.ensure_running().await.expect("gate should pass on the fourth poll");

    assert!(controller.is_running().await);
    controller.final_teardown().await;
}

#[tokio::test]
async fn readiness_timeout_is_a_hard_failure_but_keeps_the_cluster() {
    // two healthy workers forever, one short of the target
    let runtime = Arc::new(FakeRuntime::with_health_script(&[2]));
    let controller = LifecycleController::new(runtime.clone(), test_cluster_config());

    let err = controller.ensure_running().await.unwrap_err();
    assert!(matches!(err, Error::ReadinessTimeout { expected: 3, .. }));
    assert!(controller.is_running().await);

    controller.final_teardown().await;
    assert_eq!(runtime.shutdown_calls(), 1);
}

#[tokio::test]
async fn startup_failure_leaves_nothing_behind_and_next_setup_retries() {
    let runtime = Arc::new(FakeRuntime::failing_first_start(&[3]));
    let controller = LifecycleController::new(runtime.clone(), test_cluster_config());

    let err = controller.ensure_running().await.unwrap_err();
    assert!(matches!(err, Error::Startup(_)));
    assert!(!controller.is_running().await);

    controller.ensure_running().await.expect("retry should start a fresh cluster");
    assert_eq!(runtime.start_calls(), 2);

    controller.final_teardown().await;
    assert_eq!(runtime.shutdown_calls(), 1);
}
