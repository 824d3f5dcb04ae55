//! Configuration management for the Vigil assistant

pub mod file;

use std::path::PathBuf;

/// Vigil assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Spoken name of the assistant
    pub assistant_name: String,

    /// Path to the data directory (captures, caches)
    pub data_dir: PathBuf,

    /// Speech recognition configuration
    pub asr: AsrConfig,

    /// Voice synthesis configuration
    pub tts: TtsConfig,

    /// Local language-model configuration
    pub llm: LlmConfig,

    /// Security watch configuration
    pub security: SecurityConfig,

    /// Browser/application launch configuration
    pub launch: LaunchConfig,
}

/// Speech recognition configuration
#[derive(Debug, Clone)]
pub struct AsrConfig {
    /// Transcription endpoint URL
    pub endpoint: String,

    /// Optional bearer token for the transcription endpoint
    pub api_key: Option<String>,

    /// BCP-47 language tag sent with each request
    pub language: String,

    /// Seconds to wait for speech to begin before returning an empty utterance
    pub listen_timeout_secs: u64,

    /// Maximum seconds of one phrase
    pub phrase_limit_secs: u64,

    /// RMS energy above which a chunk counts as speech
    pub energy_threshold: f32,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/v1/audio/transcriptions".to_string(),
            api_key: None,
            language: "fr-FR".to_string(),
            listen_timeout_secs: 6,
            phrase_limit_secs: 15,
            energy_threshold: 0.03,
        }
    }
}

/// Voice synthesis configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Enable spoken output
    pub enabled: bool,

    /// Case-insensitive keyword for picking an installed voice
    pub voice_keyword: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            voice_keyword: None,
        }
    }
}

/// Local language-model configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible server
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Seconds to wait for an autostarted server to become healthy
    pub autostart_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "mistral".to_string(),
            temperature: 0.6,
            autostart_timeout_secs: 20,
        }
    }
}

/// Security watch configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Camera device index
    pub camera_index: i32,

    /// Minimum seconds between two captures
    pub cooldown_secs: u64,

    /// Directory where intrusion photos are written
    pub capture_dir: PathBuf,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            cooldown_secs: 10,
            capture_dir: default_data_dir(),
        }
    }
}

/// Browser/application launch configuration
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Candidate browser executable paths, tried in order before the
    /// platform-opener fallback
    pub browser_paths: Vec<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            browser_paths: vec![
                PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
                PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
                PathBuf::from("/usr/bin/google-chrome"),
                PathBuf::from("/usr/bin/chromium"),
                PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            ],
        }
    }
}

/// Default data directory: `~/.local/share/vigil/` on Linux
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/vigil"),
        |d| d.data_dir().join("vigil"),
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant_name: "Vigil".to_string(),
            data_dir: default_data_dir(),
            asr: AsrConfig::default(),
            tts: TtsConfig::default(),
            llm: LlmConfig::default(),
            security: SecurityConfig::default(),
            launch: LaunchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, overlaying the TOML file (if present) on defaults
    ///
    /// `path` overrides the standard config location; the `VIGIL_CONFIG`
    /// environment variable overrides it too (env > flag > standard path).
    #[must_use]
    pub fn load(path: Option<&std::path::Path>) -> Self {
        let env_path = std::env::var("VIGIL_CONFIG").ok().map(PathBuf::from);
        let fc = file::load_config_file(env_path.as_deref().or(path));

        let mut config = Self::default();

        if let Some(name) = fc.assistant_name {
            config.assistant_name = name;
        }

        if let Some(endpoint) = fc.asr.endpoint {
            config.asr.endpoint = endpoint;
        }
        config.asr.api_key = fc.asr.api_key.or(config.asr.api_key);
        if let Some(language) = fc.asr.language {
            config.asr.language = language;
        }
        if let Some(secs) = fc.asr.listen_timeout_secs {
            config.asr.listen_timeout_secs = secs;
        }
        if let Some(secs) = fc.asr.phrase_limit_secs {
            config.asr.phrase_limit_secs = secs;
        }
        if let Some(threshold) = fc.asr.energy_threshold {
            config.asr.energy_threshold = threshold;
        }

        if let Some(enabled) = fc.tts.enabled {
            config.tts.enabled = enabled;
        }
        config.tts.voice_keyword = fc.tts.voice_keyword.or(config.tts.voice_keyword);

        if let Some(base_url) = fc.llm.base_url {
            config.llm.base_url = base_url;
        }
        if let Some(model) = fc.llm.model {
            config.llm.model = model;
        }
        if let Some(temperature) = fc.llm.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(secs) = fc.llm.autostart_timeout_secs {
            config.llm.autostart_timeout_secs = secs;
        }

        if let Some(index) = fc.security.camera_index {
            config.security.camera_index = index;
        }
        if let Some(secs) = fc.security.cooldown_secs {
            config.security.cooldown_secs = secs;
        }
        if let Some(dir) = fc.security.capture_dir {
            config.security.capture_dir = PathBuf::from(dir);
        }

        if let Some(paths) = fc.launch.browser_paths {
            config.launch.browser_paths = paths.into_iter().map(PathBuf::from).collect();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.security.cooldown_secs, 10);
        assert_eq!(config.asr.listen_timeout_secs, 6);
        assert!(config.tts.enabled);
    }

    #[test]
    fn file_overlays_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "assistant_name = \"Marvin\"\n\n\
             [llm]\nmodel = \"llama3\"\n\n\
             [security]\ncooldown_secs = 3"
        )
        .unwrap();

        let config = Config::load(Some(f.path()));
        assert_eq!(config.assistant_name, "Marvin");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.security.cooldown_secs, 3);
        // Untouched fields keep their defaults
        assert_eq!(config.llm.base_url, "http://127.0.0.1:11434");
        assert_eq!(config.asr.phrase_limit_secs, 15);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Some(std::path::Path::new("/nonexistent/vigil.toml")));
        assert_eq!(config.assistant_name, "Vigil");
    }
}
