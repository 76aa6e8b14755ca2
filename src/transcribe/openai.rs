use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::{Transcriber, Transcript};
use crate::credentials::{require_key, CredentialProvider};
use crate::error::TranscriptionError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "whisper-1";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Request/response transcription against an OpenAI-compatible endpoint
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    base_url: String,
    model: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl OpenAiTranscriber {
    pub fn new(base_url: &str, model: &str, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, local_path: &Path) -> Result<Transcript, TranscriptionError> {
        let api_key = require_key(self.credentials.as_ref())
            .map_err(TranscriptionError::MissingCredential)?;

        let audio = tokio::fs::read(local_path).await?;
        let filename = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename)
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::RemoteError(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::RemoteError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::RemoteError(format!(
                "API error ({}): {}",
                status,
                body.trim()
            )));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            TranscriptionError::RemoteError(format!("failed to parse API response: {}", e))
        })?;

        Ok(Transcript::new(parsed.text))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
