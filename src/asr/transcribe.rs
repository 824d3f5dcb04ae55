//! HTTP transcription client

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{Error, Result};

/// Sends WAV audio to a transcription endpoint and returns the text
pub struct TranscriptionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    language: String,
}

impl TranscriptionClient {
    /// Create a client for the given endpoint
    #[must_use]
    pub fn new(endpoint: String, api_key: Option<String>, language: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            language,
        }
    }

    /// Transcribe one WAV-encoded phrase
    ///
    /// Returns the transcript lowercased and trimmed; empty when the
    /// endpoint heard nothing intelligible.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String> {
        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Asr(format!("invalid MIME type: {e}")))?;

        let form = Form::new()
            .text("language", self.language.clone())
            .part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Asr(format!("transcription request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Asr(format!(
                "transcription endpoint error: {status} - {body}"
            )));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Asr(format!("malformed transcription response: {e}")))?;

        Ok(result.text.trim().to_lowercase())
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}
