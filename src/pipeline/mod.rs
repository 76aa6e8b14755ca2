//! Stage sequencing for one acquisition → transcription → publication run.
//!
//! The orchestrator owns the downloaded audio for the whole run. Once the
//! downloader produced a file, an [`AudioArtifact`] guard deletes it right
//! after transcription, or on drop if the run leaves early some other way.

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PipelineError, Stage, StageError};
use crate::extractors::{AcquiredAudio, Downloader, Platform, SourceReference};
use crate::process::System;
use crate::publish::{PublicationStage, UploadResponse, UploadTarget};
use crate::transcribe::{Transcriber, Transcript};

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Acquiring,
    Transcribing,
    Publishing,
    Done,
    Failed { stage: Stage, error: String },
}

impl PipelineState {
    fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }

    fn rank(&self) -> u8 {
        match self {
            PipelineState::Idle => 0,
            PipelineState::Acquiring => 1,
            PipelineState::Transcribing => 2,
            PipelineState::Publishing => 3,
            PipelineState::Done | PipelineState::Failed { .. } => 4,
        }
    }
}

/// Forward-only state tracker for a single run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to the next state. Terminal states are final and no state is
    /// entered twice.
    pub fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            !self.state.is_terminal() && next.rank() > self.state.rank(),
            "invalid pipeline transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        self.history.push(next);
    }

    /// Enter `Failed` and produce the stage-tagged error
    pub fn fail(&mut self, stage: Stage, source: impl Into<StageError>) -> PipelineError {
        let error = PipelineError::new(stage, source);
        self.advance(PipelineState::Failed {
            stage,
            error: error.source.to_string(),
        });
        error
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the downloaded audio file and removes it at most once
pub struct AudioArtifact {
    audio: AcquiredAudio,
    system: Arc<dyn System>,
    released: bool,
}

impl AudioArtifact {
    pub fn new(audio: AcquiredAudio, system: Arc<dyn System>) -> Self {
        Self {
            audio,
            system,
            released: false,
        }
    }

    pub fn audio(&self) -> &AcquiredAudio {
        &self.audio
    }

    pub fn path(&self) -> &Path {
        &self.audio.local_path
    }

    /// Best-effort removal; failures are only logged
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.system.remove_file(&self.audio.local_path) {
            Ok(()) => tracing::info!(
                "Removed temporary audio file: {}",
                self.audio.local_path.display()
            ),
            Err(e) => tracing::warn!(
                "Could not remove temporary audio file {}: {}",
                self.audio.local_path.display(),
                e
            ),
        }
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        self.release();
    }
}

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub source_id: Option<String>,
    pub platform: Platform,
    pub target: UploadTarget,
    pub transcript: Transcript,
    pub response: UploadResponse,
    pub completed_at: DateTime<Utc>,
}

/// Main transcription pipeline
pub struct TranscriptionPipeline {
    system: Arc<dyn System>,
    downloader: Arc<dyn Downloader>,
    transcriber: Arc<dyn Transcriber>,
    publisher: PublicationStage,
    app_name: String,
    show_progress: bool,
}

impl TranscriptionPipeline {
    pub fn new(
        system: Arc<dyn System>,
        downloader: Arc<dyn Downloader>,
        transcriber: Arc<dyn Transcriber>,
        publisher: PublicationStage,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            system,
            downloader,
            transcriber,
            publisher,
            app_name: app_name.into(),
            show_progress: false,
        }
    }

    /// Show a spinner while each stage runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download, transcribe and publish one source
    pub async fn run(
        &self,
        source: &SourceReference,
        output_dir: &Path,
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut run = PipelineRun::new();

        run.advance(PipelineState::Acquiring);
        tracing::info!("Downloading audio from {} with {}", source, self.downloader.name());
        let progress = self.spinner("Downloading audio...");
        let downloaded = self.downloader.download_audio(source, output_dir).await;
        progress.finish_and_clear();

        let audio = downloaded.map_err(|e| run.fail(Stage::Acquisition, e))?;
        tracing::info!("Audio downloaded to: {}", audio.local_path.display());
        let mut artifact = AudioArtifact::new(audio, Arc::clone(&self.system));

        run.advance(PipelineState::Transcribing);
        tracing::info!("Transcribing audio with {}", self.transcriber.name());
        let progress = self.spinner("Transcribing audio...");
        let transcribed = self.transcriber.transcribe(artifact.path()).await;
        progress.finish_and_clear();
        artifact.release();

        let transcript = transcribed.map_err(|e| run.fail(Stage::Transcription, e))?;

        run.advance(PipelineState::Publishing);
        let audio = artifact.audio();
        let target = UploadTarget::derive(audio.platform, audio.source_id.as_deref(), &self.app_name);
        let progress = self.spinner("Uploading transcription...");
        let published = self.publisher.publish(&transcript, &target).await;
        progress.finish_and_clear();

        let response = published.map_err(|e| run.fail(Stage::Publication, e))?;
        run.advance(PipelineState::Done);

        Ok(PipelineOutcome {
            source_id: audio.source_id.clone(),
            platform: audio.platform,
            target,
            transcript,
            response,
            completed_at: Utc::now(),
        })
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
            progress.set_style(style);
        }
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
