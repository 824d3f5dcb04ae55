//! Armed/disarmed state and cooldown-gated capture

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::speech::SpeechHandle;

use super::camera::SnapshotDevice;
use super::watch::{ActivityHandler, ActivityKind, ActivitySource};

/// Owns the security state: one armed flag, one last-claim timestamp
///
/// Cheap to clone; clones share the same state. The activity callback
/// holds only a weak reference, so dropping every monitor handle detaches
/// it from still-live hook threads.
#[derive(Clone)]
pub struct SecurityMonitor {
    inner: Arc<Inner>,
}

struct Inner {
    armed: AtomicBool,
    /// Millis since `origin` of the last cooldown claim; 0 = never
    last_claim_ms: AtomicU64,
    cooldown: Duration,
    origin: Instant,
    camera: Box<dyn SnapshotDevice>,
    capture_dir: PathBuf,
    sources: Vec<Arc<dyn ActivitySource>>,
    speech: SpeechHandle,
}

impl SecurityMonitor {
    /// Create a disarmed monitor
    ///
    /// `sources` are the input-activity collaborators registered on arm,
    /// by convention one keyboard and one pointer listener.
    #[must_use]
    pub fn new(
        cooldown: Duration,
        capture_dir: PathBuf,
        camera: Box<dyn SnapshotDevice>,
        sources: Vec<Arc<dyn ActivitySource>>,
        speech: SpeechHandle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                armed: AtomicBool::new(false),
                last_claim_ms: AtomicU64::new(0),
                cooldown,
                origin: Instant::now(),
                camera,
                capture_dir,
                sources,
                speech,
            }),
        }
    }

    /// Arm the watch: any input activity now triggers a capture
    ///
    /// Idempotent: arming while armed registers nothing twice and only
    /// (optionally) says so.
    pub fn arm(&self, announce: bool) {
        if self.inner.armed.swap(true, Ordering::SeqCst) {
            if announce {
                self.inner.speech.say("La sécurité est déjà activée.");
            }
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let handler: ActivityHandler = Arc::new(move |kind| {
            if let Some(inner) = weak.upgrade() {
                inner.on_activity(kind);
            }
        });

        for source in &self.inner.sources {
            if let Err(e) = source.start(Arc::clone(&handler)) {
                tracing::error!(error = %e, "failed to start activity listener");
            }
        }

        tracing::info!("security armed");
        if announce {
            self.inner.speech.say("Sécurité activée.");
        }
    }

    /// Disarm the watch and stop the listeners
    ///
    /// Safe to call while already disarmed; the confirmation is spoken
    /// either way.
    pub fn disarm(&self) {
        self.inner.armed.store(false, Ordering::SeqCst);
        for source in &self.inner.sources {
            source.stop();
        }
        tracing::info!("security disarmed");
        self.inner.speech.say("Sécurité désactivée.");
    }

    /// Whether the watch is currently armed
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.armed.load(Ordering::SeqCst)
    }

    /// Take a cooldown-gated snapshot
    ///
    /// Within the cooldown window this is a silent no-op that does not
    /// reset the timer. The window is claimed before the camera is
    /// touched, so a failed capture still consumes it.
    pub fn capture(&self, path: Option<&Path>) {
        self.inner.capture(path);
    }
}

impl Inner {
    fn on_activity(&self, kind: ActivityKind) {
        if !self.armed.load(Ordering::SeqCst) {
            return;
        }
        tracing::debug!(?kind, "activity while armed");
        self.capture(None);
    }

    /// Claim the cooldown window; false while a prior claim is still hot
    #[allow(clippy::cast_possible_truncation)]
    fn claim_cooldown(&self) -> bool {
        let now_ms = self.origin.elapsed().as_millis() as u64;
        let last = self.last_claim_ms.load(Ordering::Relaxed);
        if last != 0 && now_ms.saturating_sub(last) < self.cooldown.as_millis() as u64 {
            return false;
        }
        // Plain store, not compare-and-swap: two threads racing the
        // boundary may both claim, which the design tolerates.
        self.last_claim_ms.store(now_ms.max(1), Ordering::Relaxed);
        true
    }

    fn capture(&self, path: Option<&Path>) {
        if !self.claim_cooldown() {
            return;
        }

        let target = path.map_or_else(
            || {
                let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
                self.capture_dir.join(format!("intrus_{stamp}.jpg"))
            },
            Path::to_path_buf,
        );

        if let Some(dir) = target.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(path = %dir.display(), error = %e, "capture dir unavailable");
            }
        }

        match self.camera.snap(&target) {
            Ok(true) => tracing::info!(path = %target.display(), "photo captured"),
            Ok(false) => tracing::warn!("camera produced no frame"),
            Err(e) => tracing::warn!(error = %e, "camera unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{SpeechQueue, Synthesizer};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    struct CountingCamera {
        calls: Arc<AtomicUsize>,
    }

    impl SnapshotDevice for CountingCamera {
        fn snap(&self, _path: &Path) -> crate::Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    struct SilentSynth;

    impl Synthesizer for SilentSynth {
        fn speak(&mut self, _text: &str) -> crate::Result<()> {
            Ok(())
        }
    }

    struct FakeSource {
        starts: AtomicUsize,
        handler: Mutex<Option<ActivityHandler>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                starts: AtomicUsize::new(0),
                handler: Mutex::new(None),
            }
        }

        fn fire(&self) {
            let handler = self.handler.lock().unwrap().clone();
            if let Some(h) = handler {
                h(ActivityKind::Key);
            }
        }
    }

    impl ActivitySource for FakeSource {
        fn start(&self, handler: ActivityHandler) -> crate::Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.handler.lock().unwrap() = Some(handler);
            Ok(())
        }

        fn stop(&self) {
            self.handler.lock().unwrap().take();
        }
    }

    fn monitor_with(
        cooldown: Duration,
        calls: &Arc<AtomicUsize>,
        source: &Arc<FakeSource>,
    ) -> (SecurityMonitor, SpeechQueue) {
        let queue = SpeechQueue::spawn(|| Ok(SilentSynth)).unwrap();
        let monitor = SecurityMonitor::new(
            cooldown,
            std::env::temp_dir(),
            Box::new(CountingCamera {
                calls: Arc::clone(calls),
            }),
            vec![Arc::clone(source) as Arc<dyn ActivitySource>],
            queue.handle(),
        );
        (monitor, queue)
    }

    #[test]
    fn rapid_activity_captures_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(FakeSource::new());
        let (monitor, _queue) = monitor_with(Duration::from_millis(200), &calls, &source);

        monitor.arm(false);
        for _ in 0..5 {
            source.fire();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn capture_revives_after_cooldown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(FakeSource::new());
        let (monitor, _queue) = monitor_with(Duration::from_millis(50), &calls, &source);

        monitor.arm(false);
        source.fire();
        std::thread::sleep(Duration::from_millis(80));
        source.fire();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arm_twice_registers_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(FakeSource::new());
        let (monitor, _queue) = monitor_with(Duration::from_millis(50), &calls, &source);

        monitor.arm(false);
        monitor.arm(true);
        assert_eq!(source.starts.load(Ordering::SeqCst), 1);
        assert!(monitor.is_armed());
    }

    #[test]
    fn activity_while_disarmed_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(FakeSource::new());
        let (monitor, _queue) = monitor_with(Duration::from_millis(50), &calls, &source);

        monitor.arm(false);
        monitor.disarm();
        source.fire();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!monitor.is_armed());
    }

    #[test]
    fn disarm_when_disarmed_is_safe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(FakeSource::new());
        let (monitor, _queue) = monitor_with(Duration::from_millis(50), &calls, &source);

        monitor.disarm();
        monitor.disarm();
        assert!(!monitor.is_armed());
    }
}
