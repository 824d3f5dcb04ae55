//! Serialized speech output queue

use std::thread::JoinHandle;

use tokio::sync::mpsc;

use crate::{Error, Result};

use super::Synthesizer;

/// Cloneable producer handle for the speech queue
///
/// Enqueueing never blocks and never fails from the caller's perspective;
/// a send after the worker has gone away is logged and dropped.
#[derive(Clone)]
pub struct SpeechHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl SpeechHandle {
    /// Queue `text` for vocalization
    pub fn say(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(message = %text, "say");
        if self.tx.send(text).is_err() {
            tracing::warn!("speech worker gone, dropping message");
        }
    }
}

/// FIFO speech queue with a dedicated synthesis worker
///
/// Messages are spoken strictly in enqueue order. A synthesis failure is
/// logged and the worker moves on to the next message; nothing queued
/// behind a failed message is lost.
pub struct SpeechQueue {
    tx: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl SpeechQueue {
    /// Spawn the worker thread
    ///
    /// `make` runs on the worker thread and builds the synthesizer there,
    /// since native voice engines are happiest created and used on one thread.
    /// If construction fails the queue still accepts messages; they are
    /// logged and discarded so the rest of the program keeps working.
    ///
    /// # Errors
    ///
    /// Returns error if the worker thread cannot be spawned
    pub fn spawn<S, F>(make: F) -> Result<Self>
    where
        S: Synthesizer,
        F: FnOnce() -> Result<S> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let worker = std::thread::Builder::new()
            .name("speech-worker".to_string())
            .spawn(move || {
                let mut synth = match make() {
                    Ok(s) => Some(s),
                    Err(e) => {
                        tracing::error!(error = %e, "voice engine unavailable, speech disabled");
                        None
                    }
                };

                while let Some(text) = rx.blocking_recv() {
                    let Some(ref mut s) = synth else {
                        tracing::debug!(message = %text, "no voice engine, dropping");
                        continue;
                    };
                    if let Err(e) = s.speak(&text) {
                        tracing::error!(error = %e, message = %text, "synthesis failed");
                    }
                }
            })
            .map_err(|e| Error::Tts(format!("failed to spawn speech worker: {e}")))?;

        Ok(Self { tx, worker })
    }

    /// Queue `text` for vocalization
    pub fn enqueue(&self, text: impl Into<String>) {
        self.handle().say(text);
    }

    /// Get a cloneable producer handle
    #[must_use]
    pub fn handle(&self) -> SpeechHandle {
        SpeechHandle {
            tx: self.tx.clone(),
        }
    }

    /// Drain the queue and stop the worker
    ///
    /// Blocks until every message enqueued so far has been spoken. All
    /// `SpeechHandle` clones must be dropped first or this will wait on
    /// them.
    pub fn shutdown(self) {
        drop(self.tx);
        if self.worker.join().is_err() {
            tracing::error!("speech worker panicked");
        }
    }
}
