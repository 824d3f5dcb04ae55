//! Local language-model client
//!
//! Talks to an Ollama-compatible server: a health check against the tag
//! list, an autostart path that spawns `ollama serve` and polls until the
//! server answers or the budget runs out, and the generation call the
//! interpreter falls back to for unmatched utterances.
//!
//! Every failure mode comes back as a speakable French phrase; the
//! caller never sees an error from here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Spoken when the server is down and could not be started
pub const UNAVAILABLE_PHRASE: &str = "Le moteur local n'est pas disponible.";

/// Spoken when the server answered with a non-success status
pub const SERVER_ERROR_PHRASE: &str = "Erreur du moteur local.";

/// Spoken when the generation request itself failed
pub const CONNECTION_ERROR_PHRASE: &str = "Erreur de connexion au moteur local.";

/// Health-check timeout; the server is local so this can be tight
const HEALTH_TIMEOUT: Duration = Duration::from_millis(1500);

/// Generation can legitimately take a while on small hardware
const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the local text-generation server
pub struct LocalLlm {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    options: GenerateOptions,
    stream: bool,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl LocalLlm {
    /// Create a client for the configured server
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Check whether the server answers its tag-list endpoint
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        match self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Make sure the server is up, spawning it if necessary
    ///
    /// Polls the health endpoint once a second for the configured budget
    /// after spawning. Returns false when the server never came up.
    pub async fn ensure_running(&self) -> bool {
        if self.is_available().await {
            return true;
        }

        let Ok(binary) = which::which("ollama") else {
            tracing::warn!("ollama binary not found, cannot autostart");
            return false;
        };

        tracing::info!(binary = %binary.display(), "starting local model server");
        match tokio::process::Command::new(&binary)
            .arg("serve")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
        {
            Ok(_child) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn local model server");
                return false;
            }
        }

        for _ in 0..self.config.autostart_timeout_secs {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if self.is_available().await {
                tracing::info!("local model server ready");
                return true;
            }
        }

        tracing::warn!(
            url = %self.config.base_url,
            "local model server did not come up in time"
        );
        false
    }

    /// Generate a reply to `prompt`
    ///
    /// Infallible by design: unavailability and request failures come
    /// back as canned phrases suitable for speaking. An empty string
    /// means the model genuinely had nothing to say.
    pub async fn generate(&self, prompt: &str) -> String {
        if !self.ensure_running().await {
            return UNAVAILABLE_PHRASE.to_string();
        }

        let url = format!("{}/api/generate", self.config.base_url);
        let payload = GenerateRequest {
            model: &self.config.model,
            prompt,
            options: GenerateOptions {
                temperature: self.config.temperature,
            },
            stream: false,
        };

        let response = match self
            .client
            .post(&url)
            .timeout(GENERATE_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "generation request failed");
                return CONNECTION_ERROR_PHRASE.to_string();
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            tracing::error!(%status, body = %preview, "generation endpoint error");
            return SERVER_ERROR_PHRASE.to_string();
        }

        match response.json::<GenerateResponse>().await {
            Ok(data) => data.response.trim().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "malformed generation response");
                SERVER_ERROR_PHRASE.to_string()
            }
        }
    }
}
