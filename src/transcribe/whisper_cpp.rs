use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Transcriber, Transcript};
use crate::error::TranscriptionError;
use crate::process::{display_command, System};

const WHISPER_CLI: &str = "whisper-cli";

/// whisper-cli appends this to the `--output-file` prefix
const OUTPUT_SUFFIX: &str = ".txt";

/// Transcriber that shells out to whisper.cpp's `whisper-cli`
pub struct WhisperCppTranscriber {
    system: Arc<dyn System>,
    model_path: PathBuf,
}

impl WhisperCppTranscriber {
    pub fn new(system: Arc<dyn System>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            system,
            model_path: model_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn command_args(&self, audio_path: &Path, output_prefix: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.model_path.to_string_lossy().into_owned(),
            "-f".to_string(),
            audio_path.to_string_lossy().into_owned(),
            "--output-txt".to_string(),
            "--output-file".to_string(),
            output_prefix.to_string_lossy().into_owned(),
            "--no-prints".to_string(),
        ]
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, local_path: &Path) -> Result<Transcript, TranscriptionError> {
        if self.system.lookup(WHISPER_CLI).is_none() {
            return Err(TranscriptionError::ToolNotFound {
                name: WHISPER_CLI.to_string(),
            });
        }

        // Removed when dropped, whichever way this function returns
        let work_dir = tempfile::Builder::new()
            .prefix("whisper-transcript-")
            .tempdir()?;
        let output_prefix = work_dir.path().join("transcript");
        let output_file = transcript_file(&output_prefix);

        let args = self.command_args(local_path, &output_prefix);
        tracing::debug!("Executing command: {}", display_command(WHISPER_CLI, &args));

        let output = self.system.run(WHISPER_CLI, &args).await?;
        if !output.success {
            return Err(TranscriptionError::ProcessFailed {
                tool: WHISPER_CLI.to_string(),
                exit: output.exit_description(),
                output: output.combined,
            });
        }

        let text = read_transcript(&output_file).await?;
        drop(work_dir);

        Ok(Transcript::new(text))
    }

    fn name(&self) -> &'static str {
        "whisper-cpp"
    }
}

fn transcript_file(output_prefix: &Path) -> PathBuf {
    let mut path = output_prefix.as_os_str().to_owned();
    path.push(OUTPUT_SUFFIX);
    PathBuf::from(path)
}

async fn read_transcript(path: &Path) -> Result<String, TranscriptionError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::debug!("Failed to read {}: {}", path.display(), e);
        TranscriptionError::OutputUnreadable {
            path: path.to_path_buf(),
        }
    })
}
