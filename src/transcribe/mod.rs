use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub mod ollama;
pub mod openai;
pub mod whisper_cpp;

pub use ollama::OllamaTranscriber;
pub use openai::OpenAiTranscriber;
pub use whisper_cpp::WhisperCppTranscriber;

use crate::error::TranscriptionError;

/// Text produced by a transcriber. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript(String);

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a local audio file into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, local_path: &Path) -> Result<Transcript, TranscriptionError>;

    /// Name of this backend
    fn name(&self) -> &'static str;
}
