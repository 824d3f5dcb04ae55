//! Daemon - the assistant's main service
//!
//! Wires the speech queue, security monitor, interpreter, and microphone
//! together, then runs the listen/dispatch loop until the quit intent,
//! the HUD quit affordance, or Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::asr::{MicUtteranceSource, UtteranceSource};
use crate::hud::{self, HudHandle};
use crate::intent::{Actions, CommandInterpreter, DispatchOutcome, MediaTap, SystemLauncher};
use crate::llm::LocalLlm;
use crate::security::{ActivitySource, InputListener, SecurityMonitor, Webcam};
use crate::speech::{NativeSynth, NullSynth, SpeechQueue};
use crate::{Config, Result};

/// Pause after an unexpected dispatch error, so a persistent failure
/// can't spin the loop hot
const ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// The Vigil daemon - one long-running assistant process
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a daemon from loaded configuration
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until the quit intent, HUD quit, or Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error on fatal startup failures (no microphone, speech
    /// worker unavailable); runtime errors are contained by the loop
    #[allow(clippy::future_not_send)]
    pub async fn run(self) -> Result<()> {
        tracing::info!(assistant = %self.config.assistant_name, "daemon starting");

        // Shutdown channel: Ctrl-C and the HUD quit affordance feed it
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let ctrl_c_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = ctrl_c_tx.send(()).await;
            }
        });

        let hud = hud::spawn(shutdown_tx);
        hud.set_status(format!("{} prêt.", self.config.assistant_name));
        hud.append("Démarrage…");

        // Speech queue; the voice engine lives on the worker thread
        let queue = if self.config.tts.enabled {
            let keyword = self.config.tts.voice_keyword.clone();
            SpeechQueue::spawn(move || NativeSynth::new(keyword.as_deref()))?
        } else {
            SpeechQueue::spawn(|| Ok(NullSynth))?
        };

        let monitor = SecurityMonitor::new(
            Duration::from_secs(self.config.security.cooldown_secs),
            self.config.security.capture_dir.clone(),
            Box::new(Webcam::new(self.config.security.camera_index)),
            vec![
                Arc::new(InputListener::keyboard()) as Arc<dyn ActivitySource>,
                Arc::new(InputListener::pointer()) as Arc<dyn ActivitySource>,
            ],
            queue.handle(),
        );

        let actions = Actions::new(
            queue.handle(),
            monitor.clone(),
            Box::new(SystemLauncher::new(self.config.launch.browser_paths.clone())),
            Box::new(MediaTap::new()),
        );
        let interpreter = CommandInterpreter::new(actions, LocalLlm::new(self.config.llm.clone()))?;

        // The microphone is a fatal startup dependency
        let mut source = MicUtteranceSource::new(self.config.asr.clone())?;

        queue.enqueue("Bonjour, je suis prêt.");

        command_loop(&mut source, &interpreter, &hud, &mut shutdown_rx).await;

        // Listeners are always torn down before exit
        monitor.disarm();
        hud.set_status("Extinction.");

        drop(source);
        drop(interpreter);
        drop(monitor);
        queue.shutdown();

        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// The listen/dispatch loop
///
/// Runs until the quit intent fires or the shutdown channel signals.
/// Empty utterances loop silently; dispatch errors are logged, surfaced
/// to the HUD, and absorbed after a short backoff; nothing short of the
/// explicit signals above ends the loop.
pub async fn command_loop<S: UtteranceSource>(
    source: &mut S,
    interpreter: &CommandInterpreter,
    hud: &HudHandle,
    shutdown_rx: &mut mpsc::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown requested");
                break;
            }
            listened = source.next_utterance() => match listened {
                Ok(utterance) if utterance.is_empty() => {}
                Ok(utterance) => {
                    hud.append(format!("🗣️ Tu as dit : {utterance}"));
                    match interpreter.interpret(&utterance).await {
                        Ok(DispatchOutcome::Continue) => {}
                        Ok(DispatchOutcome::Terminate) => {
                            interpreter.actions().speak("Au revoir !");
                            break;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, utterance, "dispatch error");
                            hud.append(format!("❌ Erreur: {e}"));
                            tokio::time::sleep(ERROR_BACKOFF).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "listen error");
                    hud.append(format!("❌ Erreur: {e}"));
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }
}
