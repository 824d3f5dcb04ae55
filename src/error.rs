//! Error types for the Vigil assistant

use thiserror::Error;

/// Result type alias for Vigil operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Vigil assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech recognition error
    #[error("ASR error: {0}")]
    Asr(String),

    /// Voice synthesis error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Webcam capture error
    #[error("camera error: {0}")]
    Camera(String),

    /// Input-activity listener error
    #[error("listener error: {0}")]
    Listener(String),

    /// Local language-model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Browser or application launch error
    #[error("launch error: {0}")]
    Launch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
