//! TOML configuration file loading
//!
//! Supports `~/.config/vigil/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VigilConfigFile {
    /// Spoken name of the assistant (used in status lines and the greeting)
    #[serde(default)]
    pub assistant_name: Option<String>,

    /// Speech recognition configuration
    #[serde(default)]
    pub asr: AsrFileConfig,

    /// Voice synthesis configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// Local language-model configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Security watch configuration
    #[serde(default)]
    pub security: SecurityFileConfig,

    /// Browser/application launch configuration
    #[serde(default)]
    pub launch: LaunchFileConfig,
}

/// Speech recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct AsrFileConfig {
    /// Transcription endpoint URL
    pub endpoint: Option<String>,

    /// Optional bearer token for the transcription endpoint
    pub api_key: Option<String>,

    /// BCP-47 language tag sent with each request (e.g. "fr-FR")
    pub language: Option<String>,

    /// Seconds to wait for speech to begin before giving up
    pub listen_timeout_secs: Option<u64>,

    /// Maximum seconds of one phrase
    pub phrase_limit_secs: Option<u64>,

    /// RMS energy above which a chunk counts as speech
    pub energy_threshold: Option<f32>,
}

/// Voice synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Enable spoken output
    pub enabled: Option<bool>,

    /// Case-insensitive keyword for picking an installed voice
    pub voice_keyword: Option<String>,
}

/// Local language-model configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Base URL of the Ollama-compatible server
    pub base_url: Option<String>,

    /// Model identifier (e.g. "mistral")
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Seconds to wait for an autostarted server to become healthy
    pub autostart_timeout_secs: Option<u64>,
}

/// Security watch configuration
#[derive(Debug, Default, Deserialize)]
pub struct SecurityFileConfig {
    /// Camera device index
    pub camera_index: Option<i32>,

    /// Minimum seconds between two captures
    pub cooldown_secs: Option<u64>,

    /// Directory where intrusion photos are written
    pub capture_dir: Option<String>,
}

/// Browser/application launch configuration
#[derive(Debug, Default, Deserialize)]
pub struct LaunchFileConfig {
    /// Candidate browser executable paths, tried in order
    pub browser_paths: Option<Vec<String>>,
}

/// Load the TOML config file from `path`, or the standard path when `None`
///
/// Returns `VigilConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: Option<&std::path::Path>) -> VigilConfigFile {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let Some(p) = config_file_path() else {
                return VigilConfigFile::default();
            };
            p
        }
    };

    if !path.exists() {
        return VigilConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VigilConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VigilConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/vigil/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vigil").join("config.toml"))
}
