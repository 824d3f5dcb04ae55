//! Native OS voice synthesis

use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Upper bound on one utterance, in case the engine never reports idle
const SPEAK_DEADLINE: Duration = Duration::from_secs(60);

/// Seam between the speech queue and the voice engine
///
/// Implementations are built and used entirely on the queue's worker
/// thread (see [`super::SpeechQueue::spawn`]), so they need not be `Send`.
pub trait Synthesizer: 'static {
    /// Vocalize `text`, returning once playback has finished
    ///
    /// # Errors
    ///
    /// Returns error if the engine rejects or aborts the utterance
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Voice synthesis through the platform engine (SAPI, AVFoundation,
/// Speech Dispatcher)
pub struct NativeSynth {
    tts: tts::Tts,
}

impl NativeSynth {
    /// Create the engine and pick a voice
    ///
    /// Prefers a voice whose name contains `voice_keyword`
    /// (case-insensitive), then a "desktop"-tagged voice, then whatever
    /// the platform default is. Selection failure is only a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the platform engine cannot be initialized
    pub fn new(voice_keyword: Option<&str>) -> Result<Self> {
        let mut tts = tts::Tts::default().map_err(|e| Error::Tts(e.to_string()))?;
        select_voice(&mut tts, voice_keyword);
        Ok(Self { tts })
    }
}

impl Synthesizer for NativeSynth {
    fn speak(&mut self, text: &str) -> Result<()> {
        self.tts
            .speak(text, false)
            .map_err(|e| Error::Tts(e.to_string()))?;

        // The engine queues internally; wait for playback so our FIFO
        // ordering is the audible ordering.
        let deadline = Instant::now() + SPEAK_DEADLINE;
        loop {
            match self.tts.is_speaking() {
                Ok(true) => {
                    if Instant::now() >= deadline {
                        return Err(Error::Tts("utterance deadline exceeded".to_string()));
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Ok(false) => return Ok(()),
                Err(e) => return Err(Error::Tts(e.to_string())),
            }
        }
    }
}

/// Pick a voice by keyword, falling back to a "desktop"-tagged one
fn select_voice(tts: &mut tts::Tts, keyword: Option<&str>) {
    let voices = match tts.voices() {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "voice enumeration failed, keeping default");
            return;
        }
    };

    let chosen = keyword
        .and_then(|kw| {
            let kw = kw.to_lowercase();
            voices.iter().find(|v| v.name().to_lowercase().contains(&kw))
        })
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.name().to_lowercase().contains("desktop"))
        });

    if let Some(voice) = chosen {
        if let Err(e) = tts.set_voice(voice) {
            tracing::warn!(error = %e, voice = %voice.name(), "voice selection failed");
        } else {
            tracing::debug!(voice = %voice.name(), "voice selected");
        }
    }
}

/// Discards every message; used when spoken output is disabled
pub struct NullSynth;

impl Synthesizer for NullSynth {
    fn speak(&mut self, text: &str) -> Result<()> {
        tracing::debug!(message = %text, "muted");
        Ok(())
    }
}
