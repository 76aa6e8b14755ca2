use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub mod vercel_blob;

pub use vercel_blob::VercelBlobUploader;

use crate::error::PublicationError;
use crate::extractors::Platform;
use crate::transcribe::Transcript;

/// Root directory for transcripts whose source exposes no identifier
pub const FIXED_ROOT_DIR: &str = "yt-transcribe";

/// File name for transcripts whose source exposes no identifier
pub const FIXED_FILENAME: &str = "transcript.txt";

/// Storage path a transcript is uploaded to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadTarget(String);

impl UploadTarget {
    /// Derive the storage path from routing metadata.
    ///
    /// With an identifier the path is `{app_name}/{platform}/{source_id}`.
    /// Without one every transcript of a platform shares a fixed file, and
    /// anything that is not Instagram lands under the YouTube directory.
    ///
    /// The identifier always stays a single path segment: separators are
    /// replaced with `_`, and an identifier made only of dots counts as none.
    pub fn derive(platform: Platform, source_id: Option<&str>, app_name: &str) -> Self {
        match source_id.and_then(path_segment) {
            Some(id) => Self(format!(
                "{}/{}/{}",
                app_name.replace('\\', "/"),
                platform.as_str(),
                id
            )),
            None => {
                let subdir = match platform {
                    Platform::Instagram => Platform::Instagram,
                    Platform::YouTube | Platform::Other => Platform::YouTube,
                };
                Self(format!(
                    "{}/{}/{}",
                    FIXED_ROOT_DIR,
                    subdir.as_str(),
                    FIXED_FILENAME
                ))
            }
        }
    }

    /// Blob paths always use forward slashes
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn path_segment(source_id: &str) -> Option<String> {
    let segment = source_id.trim().replace(['/', '\\'], "_");
    if segment.is_empty() || segment.chars().all(|c| c == '.') {
        None
    } else {
        Some(segment)
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the blob store answered for one upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    pub path: String,
    pub body: String,
}

/// Transport to a remote blob store
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `content` to `path`, returning the raw response body
    async fn upload(&self, content: &str, path: &str) -> Result<String, PublicationError>;

    /// Name of this backend
    fn name(&self) -> &'static str;
}

/// Hands transcripts to an [`Uploader`], optionally keeping a local copy
pub struct PublicationStage {
    uploader: Arc<dyn Uploader>,
    mirror_dir: Option<PathBuf>,
}

impl PublicationStage {
    pub fn new(uploader: Arc<dyn Uploader>) -> Self {
        Self {
            uploader,
            mirror_dir: None,
        }
    }

    /// Also write every transcript to `<dir>/<target>` before uploading
    pub fn with_mirror_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mirror_dir = Some(dir.into());
        self
    }

    pub async fn publish(
        &self,
        transcript: &Transcript,
        target: &UploadTarget,
    ) -> Result<UploadResponse, PublicationError> {
        if let Some(dir) = &self.mirror_dir {
            let local = save_copy(dir, transcript, target)?;
            tracing::info!("Transcription saved to: {}", local.display());
        }

        tracing::info!(
            "Uploading {} bytes to {} via {}",
            transcript.len(),
            target,
            self.uploader.name()
        );
        let body = self.uploader.upload(transcript.as_str(), target.as_str()).await?;

        Ok(UploadResponse {
            path: target.as_str().to_string(),
            body,
        })
    }
}

fn save_copy(
    dir: &Path,
    transcript: &Transcript,
    target: &UploadTarget,
) -> Result<PathBuf, PublicationError> {
    let relative = Path::new(target.as_str());
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(PublicationError::Mirror {
            path: relative.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "upload path must stay inside the mirror directory",
            ),
        });
    }

    let local = dir.join(relative);
    let mirror_error = |source| PublicationError::Mirror {
        path: local.clone(),
        source,
    };

    if let Some(parent) = local.parent() {
        fs_err::create_dir_all(parent).map_err(mirror_error)?;
    }
    fs_err::write(&local, transcript.as_str()).map_err(mirror_error)?;

    Ok(local)
}
