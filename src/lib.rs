//! Vigil - desktop voice assistant with a webcam intrusion watch
//!
//! This library provides the core functionality of the Vigil assistant:
//! - Utterance capture and transcription (microphone → phrase → text)
//! - Intent dispatch with a local-LLM fallback
//! - Serialized, crash-isolated spoken output
//! - An armed/disarmed security watch with cooldown-gated captures
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   Main Loop (daemon)                 │
//! │    microphone → phrase → transcript → interpret      │
//! └──────┬──────────────────┬───────────────────┬───────┘
//!        │                  │                   │
//! ┌──────▼───────┐  ┌───────▼────────┐  ┌───────▼───────┐
//! │ Intent rules │  │ Security watch │  │ Speech queue  │
//! │ + LLM        │  │ key/pointer →  │  │ FIFO → voice  │
//! │ fallback     │  │ webcam capture │  │ engine worker │
//! └──────────────┘  └────────────────┘  └───────────────┘
//! ```

pub mod asr;
pub mod config;
pub mod daemon;
pub mod error;
pub mod hud;
pub mod intent;
pub mod llm;
pub mod security;
pub mod speech;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use intent::{
    Actions, CommandInterpreter, DispatchOutcome, Handler, MediaControl, MediaTap,
    SystemLauncher, UrlLauncher,
};
pub use llm::LocalLlm;
pub use security::{
    ActivityHandler, ActivityKind, ActivitySource, InputListener, SecurityMonitor,
    SnapshotDevice, Webcam,
};
pub use speech::{NativeSynth, NullSynth, SpeechHandle, SpeechQueue, Synthesizer};
