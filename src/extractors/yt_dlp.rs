use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{AcquiredAudio, Downloader, SourceReference};
use crate::error::AcquisitionError;
use crate::parser;
use crate::process::{display_command, System, ToolOutput};

const YT_DLP: &str = "yt-dlp";
const FFMPEG: &str = "ffmpeg";

/// Container written by audio extraction
pub const AUDIO_EXTENSION: &str = "wav";

/// yt-dlp backed audio downloader.
///
/// The video identifier is looked up first and the output is named
/// `{identifier}.wav`, so the artifact path is known before the download
/// starts. yt-dlp needs ffmpeg for the audio conversion.
pub struct YtDlpDownloader {
    system: Arc<dyn System>,
}

impl YtDlpDownloader {
    pub fn new(system: Arc<dyn System>) -> Self {
        Self { system }
    }

    /// Verify the helper binaries, media helper first
    fn check_tools(&self) -> Result<(), AcquisitionError> {
        for name in [FFMPEG, YT_DLP] {
            if self.system.lookup(name).is_none() {
                return Err(AcquisitionError::ToolNotFound {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn run(&self, args: Vec<String>) -> Result<ToolOutput, AcquisitionError> {
        tracing::debug!("Executing command: {}", display_command(YT_DLP, &args));
        Ok(self.system.run(YT_DLP, &args).await?)
    }

    async fn lookup_video_id(&self, source: &SourceReference) -> Result<String, AcquisitionError> {
        let output = self
            .run(vec!["--get-id".to_string(), source.to_string()])
            .await?;

        if !output.success {
            return Err(AcquisitionError::ProcessFailed {
                tool: YT_DLP.to_string(),
                exit: output.exit_description(),
                output: output.combined,
            });
        }

        Ok(parser::parse_identifier(&output.combined)?)
    }
}

/// Arguments for an audio-only extraction into `output_path`
fn extraction_args(source: &SourceReference, output_path: &Path) -> Vec<String> {
    vec![
        // Extract audio
        "-x".to_string(),
        "--audio-format".to_string(),
        AUDIO_EXTENSION.to_string(),
        "--output".to_string(),
        output_path.to_string_lossy().into_owned(),
        // Keep filenames simple
        "--restrict-filenames".to_string(),
        source.to_string(),
    ]
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download_audio(
        &self,
        source: &SourceReference,
        output_dir: &Path,
    ) -> Result<AcquiredAudio, AcquisitionError> {
        self.check_tools()?;

        let video_id = self.lookup_video_id(source).await?;
        tracing::info!("Resolved video id: {}", video_id);

        tokio::fs::create_dir_all(output_dir).await?;
        let output_path: PathBuf = output_dir.join(format!("{}.{}", video_id, AUDIO_EXTENSION));

        let output = self.run(extraction_args(source, &output_path)).await?;
        let present = self.system.exists(&output_path);

        if !output.success {
            if !present {
                return Err(AcquisitionError::ProcessFailed {
                    tool: YT_DLP.to_string(),
                    exit: output.exit_description(),
                    output: output.combined,
                });
            }
            // yt-dlp can exit non-zero after warnings while still producing the file
            tracing::warn!(
                "yt-dlp exited with {} but produced {}; continuing",
                output.exit_description(),
                output_path.display()
            );
        } else if !present {
            return Err(AcquisitionError::ArtifactMissing {
                expected_path: output_path,
            });
        }

        Ok(AcquiredAudio {
            local_path: output_path,
            source_id: Some(video_id),
            platform: source.platform(),
        })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
