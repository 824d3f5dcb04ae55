//! Shared fakes for integration tests
//!
//! Everything hardware- or network-shaped is replaced with a recording
//! double so tests observe behavior without devices.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vigil_assistant::config::LlmConfig;
use vigil_assistant::security::ActivityHandler;
use vigil_assistant::{
    Actions, ActivityKind, ActivitySource, CommandInterpreter, Error, LocalLlm, MediaControl,
    Result, SecurityMonitor, SnapshotDevice, SpeechQueue, Synthesizer, UrlLauncher,
};

/// Records every spoken message, optionally sleeping first to simulate a
/// slow engine
pub struct RecordingSynth {
    spoken: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

impl Synthesizer for RecordingSynth {
    fn speak(&mut self, text: &str) -> Result<()> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Spawn a speech queue backed by a recording synthesizer
pub fn recording_queue(delay: Duration) -> (SpeechQueue, Arc<Mutex<Vec<String>>>) {
    let spoken = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&spoken);
    let queue = SpeechQueue::spawn(move || {
        Ok(RecordingSynth {
            spoken: recorder,
            delay,
        })
    })
    .unwrap();
    (queue, spoken)
}

/// Records opened URLs and browser launches instead of spawning anything
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    pub urls: Arc<Mutex<Vec<String>>>,
    pub browser_opens: Arc<AtomicUsize>,
}

impl UrlLauncher for RecordingLauncher {
    fn open_url(&self, url: &str) -> Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn open_browser(&self) -> Result<()> {
        self.browser_opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records media key taps
#[derive(Clone, Default)]
pub struct RecordingMedia {
    pub taps: Arc<Mutex<Vec<String>>>,
}

impl MediaControl for RecordingMedia {
    fn play_pause(&self) -> Result<()> {
        self.taps.lock().unwrap().push("play-pause".to_string());
        Ok(())
    }

    fn volume(&self, up: bool) -> Result<()> {
        self.taps
            .lock()
            .unwrap()
            .push(if up { "volume-up" } else { "volume-down" }.to_string());
        Ok(())
    }
}

/// Counts snapshot attempts; the first `fail_first` calls error out
pub struct CountingCamera {
    pub calls: Arc<AtomicUsize>,
    pub fail_first: usize,
}

impl CountingCamera {
    pub fn reliable(calls: &Arc<AtomicUsize>) -> Box<Self> {
        Box::new(Self {
            calls: Arc::clone(calls),
            fail_first: 0,
        })
    }

    pub fn flaky(calls: &Arc<AtomicUsize>, fail_first: usize) -> Box<Self> {
        Box::new(Self {
            calls: Arc::clone(calls),
            fail_first,
        })
    }
}

impl SnapshotDevice for CountingCamera {
    fn snap(&self, _path: &Path) -> Result<bool> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(Error::Camera("device busy".to_string()));
        }
        Ok(true)
    }
}

/// Hand-fired activity source standing in for the input hooks
pub struct FakeSource {
    pub starts: AtomicUsize,
    handler: Mutex<Option<ActivityHandler>>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            starts: AtomicUsize::new(0),
            handler: Mutex::new(None),
        })
    }

    /// Deliver one activity event, as a hook thread would
    pub fn fire(&self) {
        let handler = self.handler.lock().unwrap().clone();
        if let Some(h) = handler {
            h(ActivityKind::Pointer);
        }
    }

    pub fn is_registered(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }
}

impl ActivitySource for FakeSource {
    fn start(&self, handler: ActivityHandler) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock().unwrap() = Some(handler);
        Ok(())
    }

    fn stop(&self) {
        self.handler.lock().unwrap().take();
    }
}

/// An LLM client pointed at nothing, with no autostart budget
pub fn offline_llm() -> LocalLlm {
    LocalLlm::new(LlmConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        model: "mistral".to_string(),
        temperature: 0.6,
        autostart_timeout_secs: 0,
    })
}

/// Everything an interpreter test needs, wired with recording doubles
pub struct Harness {
    pub interpreter: CommandInterpreter,
    pub monitor: SecurityMonitor,
    pub source: Arc<FakeSource>,
    pub camera_calls: Arc<AtomicUsize>,
    pub urls: Arc<Mutex<Vec<String>>>,
    pub taps: Arc<Mutex<Vec<String>>>,
    queue: SpeechQueue,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_cooldown(Duration::from_secs(10))
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        let (queue, spoken) = recording_queue(Duration::ZERO);
        let camera_calls = Arc::new(AtomicUsize::new(0));
        let source = FakeSource::new();

        let monitor = SecurityMonitor::new(
            cooldown,
            std::env::temp_dir().join("vigil-tests"),
            CountingCamera::reliable(&camera_calls),
            vec![Arc::clone(&source) as Arc<dyn ActivitySource>],
            queue.handle(),
        );

        let launcher = RecordingLauncher::default();
        let media = RecordingMedia::default();
        let urls = Arc::clone(&launcher.urls);
        let taps = Arc::clone(&media.taps);

        let actions = Actions::new(
            queue.handle(),
            monitor.clone(),
            Box::new(launcher),
            Box::new(media),
        );
        let interpreter = CommandInterpreter::new(actions, offline_llm()).unwrap();

        Self {
            interpreter,
            monitor,
            source,
            camera_calls,
            urls,
            taps,
            queue,
            spoken,
        }
    }

    /// Drain the speech queue and return everything spoken, in order
    pub fn finish(self) -> Vec<String> {
        drop(self.interpreter);
        drop(self.monitor);
        self.queue.shutdown();
        let spoken = self.spoken.lock().unwrap();
        spoken.clone()
    }
}
