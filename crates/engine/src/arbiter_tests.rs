use super::*;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn proj(name: &str) -> PathBuf {
    PathBuf::from("/tmp").join(name)
}

#[tokio::test]
async fn grants_immediately_when_free() {
    let arbiter = ResourceArbiter::new();
    let guard = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("a"), Duration::from_millis(100))
        .await
        .expect("should acquire free resources");
    guard.release();
}

#[tokio::test]
async fn second_acquire_on_same_port_waits_for_release() {
    let arbiter = ResourceArbiter::new();
    let guard = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("a"), Duration::from_millis(100))
        .await
        .unwrap();

    let arbiter2 = arbiter.clone();
    let waiter = tokio::spawn(async move {
        arbiter2
            .acquire(Some("/dev/ttyUSB0"), &proj("b"), Duration::from_secs(5))
            .await
    });

    // give the waiter a moment to enqueue, then release
    tokio::time::sleep(Duration::from_millis(20)).await;
    guard.release();

    let second = waiter.await.unwrap().expect("should acquire after release");
    second.release();
}

#[tokio::test]
async fn distinct_ports_do_not_block_each_other() {
    let arbiter = ResourceArbiter::new();
    let g1 = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("a"), Duration::from_millis(100))
        .await
        .unwrap();
    let g2 = arbiter
        .acquire(Some("/dev/ttyUSB1"), &proj("b"), Duration::from_millis(100))
        .await
        .unwrap();
    g1.release();
    g2.release();
}

#[tokio::test]
async fn same_project_blocks_even_with_no_port() {
    let arbiter = ResourceArbiter::new();
    let guard = arbiter
        .acquire(None, &proj("shared"), Duration::from_millis(100))
        .await
        .unwrap();

    let err = arbiter
        .acquire(None, &proj("shared"), Duration::from_millis(30))
        .await
        .unwrap_err();
    assert!(matches!(err, ArbiterError::Timeout));
    guard.release();
}

#[tokio::test]
async fn times_out_when_contended() {
    let arbiter = ResourceArbiter::new();
    let _guard = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("a"), Duration::from_millis(100))
        .await
        .unwrap();

    let err = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("b"), Duration::from_millis(30))
        .await
        .unwrap_err();
    assert!(matches!(err, ArbiterError::Timeout));
}

/// The first waiter to enqueue for a busy port is the first granted once
/// it frees up, even when a brand-new acquire for the same port races in
/// right as the release happens.
#[tokio::test]
async fn earliest_waiter_wins_over_a_later_arrival() {
    let arbiter = ResourceArbiter::new();
    let guard = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("a"), Duration::from_millis(200))
        .await
        .unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));

    let arbiter_first = arbiter.clone();
    let order_first = order.clone();
    let first = tokio::spawn(async move {
        let g = arbiter_first
            .acquire(Some("/dev/ttyUSB0"), &proj("b"), Duration::from_secs(5))
            .await
            .unwrap();
        order_first.lock().push("first");
        g
    });

    // Ensure `first` is enqueued before `second` shows up.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let arbiter_second = arbiter.clone();
    let order_second = order.clone();
    let second = tokio::spawn(async move {
        let g = arbiter_second
            .acquire(Some("/dev/ttyUSB0"), &proj("c"), Duration::from_secs(5))
            .await
            .unwrap();
        order_second.lock().push("second");
        g
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    guard.release();

    let g1 = first.await.unwrap();
    g1.release();
    let g2 = second.await.unwrap();
    g2.release();

    assert_eq!(*order.lock(), vec!["first", "second"]);
}

/// A waiter that has already timed out (dropped its receiver) must not
/// swallow the wakeup meant for the resource: the next still-live waiter
/// in line is granted instead.
#[tokio::test]
async fn release_skips_a_timed_out_waiter_and_wakes_the_next_one() {
    let arbiter = ResourceArbiter::new();
    let guard = arbiter
        .acquire(Some("/dev/ttyUSB0"), &proj("a"), Duration::from_millis(200))
        .await
        .unwrap();

    let arbiter_timeout = arbiter.clone();
    let timeout_waiter = tokio::spawn(async move {
        arbiter_timeout
            .acquire(Some("/dev/ttyUSB0"), &proj("b"), Duration::from_millis(30))
            .await
    });

    // Let the first waiter enqueue and then time out before the second
    // one shows up.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(matches!(
        timeout_waiter.await.unwrap().unwrap_err(),
        ArbiterError::Timeout
    ));

    let arbiter_live = arbiter.clone();
    let live_waiter = tokio::spawn(async move {
        arbiter_live
            .acquire(Some("/dev/ttyUSB0"), &proj("c"), Duration::from_secs(5))
            .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    guard.release();

    let granted = live_waiter.await.unwrap().expect("should still be granted");
    granted.release();
}
