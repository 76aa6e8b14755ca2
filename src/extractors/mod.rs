use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub mod yt_dlp;

pub use yt_dlp::YtDlpDownloader;

use crate::error::AcquisitionError;

/// Coarse classification of where a source URL comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Instagram,
    Other,
}

impl Platform {
    /// Classify a host by substring match, checked in order
    pub fn classify(host: &str) -> Self {
        let host = host.to_lowercase();
        if host.contains("youtube.com") {
            Platform::YouTube
        } else if host.contains("instagram.com") {
            Platform::Instagram
        } else {
            Platform::Other
        }
    }

    /// Path segment used when publishing
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote video URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    url: Url,
}

impl SourceReference {
    pub fn parse(input: &str) -> crate::Result<Self> {
        let url = Url::parse(input.trim())
            .map_err(|_| anyhow::anyhow!("Invalid video URL provided: {}", input))?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn platform(&self) -> Platform {
        Platform::classify(self.url.host_str().unwrap_or_default())
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Audio file produced by a downloader for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredAudio {
    pub local_path: PathBuf,

    /// Identifier assigned by the source platform, when the backend exposes one
    pub source_id: Option<String>,

    pub platform: Platform,
}

/// Fetches the audio track of a remote video into a local directory
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download_audio(
        &self,
        source: &SourceReference,
        output_dir: &Path,
    ) -> Result<AcquiredAudio, AcquisitionError>;

    /// Name of this backend
    fn name(&self) -> &'static str;
}
