//! Ollama transcription backend.
//!
//! The generate endpoint answers with newline-delimited JSON frames. A
//! producer task decodes the frames into [`StreamEvent`]s and a single
//! consumer concatenates the fragments in arrival order until the stream
//! signals completion. An error frame ends the exchange and the partial text
//! is thrown away.

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::mpsc;
use url::Url;

use super::{Transcriber, Transcript};
use crate::error::TranscriptionError;

const PROMPT: &str = "transcribe the following audio file:";

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "whisper";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateFrame {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// One decoded event of a streamed generate exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    Done,
    Error(String),
}

impl StreamEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

pub struct OllamaTranscriber {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl OllamaTranscriber {
    pub fn new(host: &str, model: &str) -> crate::Result<Self> {
        if host.trim().is_empty() {
            anyhow::bail!("Ollama host is not set");
        }

        // Any path on the host (a reverse proxy prefix) is kept
        let mut endpoint = Url::parse(host.trim()).context("Invalid Ollama host URL")?;
        endpoint
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid Ollama host URL: {}", host))?
            .pop_if_empty()
            .extend(["api", "generate"]);

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transcriber for OllamaTranscriber {
    async fn transcribe(&self, local_path: &Path) -> Result<Transcript, TranscriptionError> {
        let audio = tokio::fs::read(local_path).await?;

        let request = GenerateRequest {
            model: &self.model,
            prompt: PROMPT,
            images: vec![BASE64.encode(&audio)],
            stream: true,
        };

        tracing::debug!("Posting {} bytes of audio to {}", audio.len(), self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| TranscriptionError::RemoteError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::RemoteError(format!(
                "Ollama returned {}: {}",
                status,
                body.trim()
            )));
        }

        let (events, receiver) = mpsc::channel(32);
        tokio::spawn(forward_frames(response, events));

        accumulate(receiver).await
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

/// Producer: decode the response body into events until a terminal one
async fn forward_frames(response: reqwest::Response, events: mpsc::Sender<StreamEvent>) {
    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = events.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };
        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            if !send_all(&events, decode_frame(&line)).await {
                return;
            }
        }
    }

    // Last frame may come without a trailing newline
    send_all(&events, decode_frame(&buffer)).await;
}

/// Returns false once the exchange is over or the consumer is gone
async fn send_all(events: &mpsc::Sender<StreamEvent>, batch: Vec<StreamEvent>) -> bool {
    for event in batch {
        let terminal = event.is_terminal();
        if events.send(event).await.is_err() || terminal {
            return false;
        }
    }
    true
}

fn decode_frame(line: &[u8]) -> Vec<StreamEvent> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let frame: GenerateFrame = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(e) => return vec![StreamEvent::Error(format!("malformed stream frame: {}", e))],
    };

    if let Some(message) = frame.error {
        return vec![StreamEvent::Error(message)];
    }

    let mut decoded = Vec::with_capacity(2);
    if let Some(fragment) = frame.response.filter(|f| !f.is_empty()) {
        decoded.push(StreamEvent::Fragment(fragment));
    }
    if frame.done {
        decoded.push(StreamEvent::Done);
    }
    decoded
}

/// Consumer: concatenate fragments until completion
pub async fn accumulate(
    mut events: mpsc::Receiver<StreamEvent>,
) -> Result<Transcript, TranscriptionError> {
    let mut text = String::new();

    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Fragment(fragment) => text.push_str(&fragment),
            StreamEvent::Done => return Ok(Transcript::new(text)),
            StreamEvent::Error(message) => return Err(TranscriptionError::RemoteError(message)),
        }
    }

    Err(TranscriptionError::RemoteError(
        "stream ended before completion".to_string(),
    ))
}
