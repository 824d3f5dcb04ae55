//! Security watch integration tests
//!
//! Cooldown gating, arm/disarm idempotence, and the optimistic cooldown
//! claim, driven both directly and through spoken commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vigil_assistant::{ActivitySource, SecurityMonitor};

mod common;
use common::{CountingCamera, FakeSource, Harness, recording_queue};

fn bare_monitor(
    cooldown: Duration,
    camera: Box<CountingCamera>,
    source: &Arc<FakeSource>,
) -> (SecurityMonitor, vigil_assistant::SpeechQueue) {
    let (queue, _spoken) = recording_queue(Duration::ZERO);
    let monitor = SecurityMonitor::new(
        cooldown,
        std::env::temp_dir().join("vigil-tests"),
        camera,
        vec![Arc::clone(source) as Arc<dyn ActivitySource>],
        queue.handle(),
    );
    (monitor, queue)
}

#[test]
fn a_burst_of_activity_captures_at_most_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::new();
    let (monitor, _queue) = bare_monitor(
        Duration::from_millis(200),
        CountingCamera::reliable(&calls),
        &source,
    );

    monitor.arm(false);
    for _ in 0..20 {
        source.fire();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn activity_across_the_cooldown_boundary_captures_twice() {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::new();
    let (monitor, _queue) = bare_monitor(
        Duration::from_millis(60),
        CountingCamera::reliable(&calls),
        &source,
    );

    monitor.arm(false);
    source.fire();
    std::thread::sleep(Duration::from_millis(100));
    source.fire();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn a_failed_capture_still_consumes_the_cooldown() {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::new();
    // First snapshot attempt errors out
    let (monitor, _queue) = bare_monitor(
        Duration::from_millis(200),
        CountingCamera::flaky(&calls, 1),
        &source,
    );

    monitor.capture(None);
    monitor.capture(None);

    // The second call fell inside the window claimed by the failure, so
    // the camera was only touched once
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn manual_capture_works_while_disarmed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::new();
    let (monitor, _queue) = bare_monitor(
        Duration::from_millis(200),
        CountingCamera::reliable(&calls),
        &source,
    );

    assert!(!monitor.is_armed());
    monitor.capture(None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_photo_commands_confirm_but_rate_limit() {
    let h = Harness::new();

    h.interpreter.interpret("photo").await.unwrap();
    h.interpreter.interpret("prends une photo").await.unwrap();

    // Both commands were acknowledged out loud, but the second fell
    // inside the cooldown window
    assert_eq!(h.camera_calls.load(Ordering::SeqCst), 1);
    let spoken = h.finish();
    assert_eq!(
        spoken,
        vec![
            "Capture effectuée.".to_string(),
            "Capture effectuée.".to_string()
        ]
    );
}

#[tokio::test]
async fn rearming_speaks_a_notice_and_registers_nothing_twice() {
    let h = Harness::new();

    h.interpreter.interpret("active la sécurité").await.unwrap();
    h.interpreter.interpret("lance la sécurité").await.unwrap();

    assert!(h.monitor.is_armed());
    assert_eq!(h.source.starts.load(Ordering::SeqCst), 1);

    let spoken = h.finish();
    assert_eq!(
        spoken,
        vec![
            "Sécurité activée.".to_string(),
            "La sécurité est déjà activée.".to_string()
        ]
    );
}

#[tokio::test]
async fn disarming_twice_is_safe_and_always_confirms() {
    let h = Harness::new();

    h.interpreter
        .interpret("désactive la sécurité")
        .await
        .unwrap();
    h.interpreter
        .interpret("surveillance off")
        .await
        .unwrap();

    assert!(!h.monitor.is_armed());
    let spoken = h.finish();
    assert_eq!(
        spoken,
        vec![
            "Sécurité désactivée.".to_string(),
            "Sécurité désactivée.".to_string()
        ]
    );
}
