//! Energy-based phrase segmentation
//!
//! Chunks of microphone samples go in; a complete phrase comes out once
//! speech has been followed by enough trailing silence. The listen
//! timeout bounds how long we wait for speech to begin, the phrase limit
//! bounds how long one phrase can run.

use super::SAMPLE_RATE;

/// Minimum duration of speech to accept a phrase (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends a phrase (0.5s)
const SILENCE_SAMPLES: usize = 8000;

/// Segmentation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhraseState {
    /// Waiting for speech to begin
    Waiting,
    /// Speech detected, accumulating the phrase
    Capturing,
}

/// Result of feeding one chunk of samples
#[derive(Debug)]
pub enum PhraseOutcome {
    /// Nothing decided yet, keep feeding
    Pending,
    /// No usable speech within the listen timeout
    TimedOut,
    /// A phrase is ready for transcription
    Complete(Vec<f32>),
}

/// Accumulates one phrase from a stream of sample chunks
pub struct PhraseDetector {
    energy_threshold: f32,
    listen_timeout_samples: usize,
    phrase_limit_samples: usize,
    state: PhraseState,
    idle_samples: usize,
    speech_buffer: Vec<f32>,
    silence_counter: usize,
}

impl PhraseDetector {
    /// Create a detector for a single listen window
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(energy_threshold: f32, listen_timeout_secs: u64, phrase_limit_secs: u64) -> Self {
        let rate = SAMPLE_RATE as usize;
        Self {
            energy_threshold,
            listen_timeout_samples: rate * listen_timeout_secs as usize,
            phrase_limit_samples: rate * phrase_limit_secs as usize,
            state: PhraseState::Waiting,
            idle_samples: 0,
            speech_buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Feed the next chunk of samples
    pub fn feed(&mut self, samples: &[f32]) -> PhraseOutcome {
        let is_speech = rms(samples) > self.energy_threshold;

        match self.state {
            PhraseState::Waiting => {
                if is_speech {
                    self.state = PhraseState::Capturing;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!("speech onset");
                    if self.speech_buffer.len() >= self.phrase_limit_samples {
                        return PhraseOutcome::Complete(std::mem::take(&mut self.speech_buffer));
                    }
                } else {
                    self.idle_samples += samples.len();
                    if self.idle_samples >= self.listen_timeout_samples {
                        return PhraseOutcome::TimedOut;
                    }
                }
                PhraseOutcome::Pending
            }
            PhraseState::Capturing => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                // Phrase limit: cut the phrase rather than grow unbounded
                if self.speech_buffer.len() >= self.phrase_limit_samples {
                    tracing::debug!(samples = self.speech_buffer.len(), "phrase limit reached");
                    return PhraseOutcome::Complete(std::mem::take(&mut self.speech_buffer));
                }

                if self.silence_counter > SILENCE_SAMPLES {
                    // The buffer carries the trailing silence too; only
                    // the voiced part counts toward the minimum
                    let voiced = self.speech_buffer.len().saturating_sub(self.silence_counter);
                    if voiced > MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = self.speech_buffer.len(), "phrase complete");
                        return PhraseOutcome::Complete(std::mem::take(&mut self.speech_buffer));
                    }
                    // Too short to be speech; drop it and keep waiting,
                    // the time spent still counts against the timeout
                    self.idle_samples += self.speech_buffer.len();
                    self.speech_buffer.clear();
                    self.silence_counter = 0;
                    self.state = PhraseState::Waiting;
                }
                PhraseOutcome::Pending
            }
        }
    }
}

/// RMS energy of a chunk of samples
#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
