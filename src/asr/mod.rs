//! Utterance acquisition
//!
//! Microphone capture, energy-based phrase segmentation, and HTTP
//! transcription, combined behind the [`UtteranceSource`] seam the main
//! loop consumes. Silence, timeouts, and transcription hiccups all come
//! back as an empty utterance; only hard device failures are errors.

mod capture;
mod segment;
mod transcribe;

pub use capture::{MicCapture, SAMPLE_RATE, samples_to_wav};
pub use segment::{PhraseDetector, PhraseOutcome};
pub use transcribe::TranscriptionClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::config::AsrConfig;

/// Polling interval for the capture buffer (100ms of audio at 16kHz)
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum phrase worth transcribing (half a second of audio)
const MIN_PHRASE_SAMPLES: usize = SAMPLE_RATE as usize / 2;

/// One blocking listen, bounded by the configured timeout and phrase limit
#[async_trait(?Send)]
pub trait UtteranceSource {
    /// Wait for one utterance
    ///
    /// Returns the lowercase, trimmed transcript, or an empty string on
    /// silence, timeout, or unrecognized speech.
    ///
    /// # Errors
    ///
    /// Returns error only for hard audio-device failures
    async fn next_utterance(&mut self) -> Result<String>;
}

/// Microphone-backed utterance source
pub struct MicUtteranceSource {
    capture: MicCapture,
    transcriber: TranscriptionClient,
    config: AsrConfig,
}

impl MicUtteranceSource {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if no suitable input device is available
    pub fn new(config: AsrConfig) -> Result<Self> {
        let capture = MicCapture::new()?;
        let transcriber = TranscriptionClient::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.language.clone(),
        );
        Ok(Self {
            capture,
            transcriber,
            config,
        })
    }
}

#[async_trait(?Send)]
impl UtteranceSource for MicUtteranceSource {
    async fn next_utterance(&mut self) -> Result<String> {
        self.capture.start()?;

        let mut detector = PhraseDetector::new(
            self.config.energy_threshold,
            self.config.listen_timeout_secs,
            self.config.phrase_limit_secs,
        );

        // Wall-clock bound in case the device stops delivering samples;
        // the detector's own counters only advance with incoming audio
        let started = std::time::Instant::now();
        let deadline =
            Duration::from_secs(self.config.listen_timeout_secs + self.config.phrase_limit_secs);

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            if started.elapsed() > deadline {
                return Ok(String::new());
            }

            let samples = self.capture.take_buffer();
            match detector.feed(&samples) {
                PhraseOutcome::Pending => {}
                PhraseOutcome::TimedOut => return Ok(String::new()),
                PhraseOutcome::Complete(phrase) => {
                    if phrase.len() < MIN_PHRASE_SAMPLES {
                        return Ok(String::new());
                    }
                    let wav = samples_to_wav(&phrase, SAMPLE_RATE)?;
                    return match self.transcriber.transcribe(wav).await {
                        Ok(text) => Ok(text),
                        Err(e) => {
                            tracing::warn!(error = %e, "transcription failed");
                            Ok(String::new())
                        }
                    };
                }
            }
        }
    }
}
