use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use yt_transcribe::{
    AcquiredAudio, AcquisitionError, Downloader, Platform, PublicationError, PublicationStage,
    SourceReference, Stage, StageError, System, ToolOutput, Transcriber, Transcript,
    TranscriptionError, TranscriptionPipeline, Uploader,
};

/// Records every removal request
#[derive(Default)]
struct RecordingSystem {
    removed: Mutex<Vec<PathBuf>>,
}

impl RecordingSystem {
    fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl System for RecordingSystem {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(name))
    }

    async fn run(&self, _program: &str, _args: &[String]) -> io::Result<ToolOutput> {
        Ok(ToolOutput::success(""))
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

struct StubDownloader {
    result: fn(&Path) -> Result<AcquiredAudio, AcquisitionError>,
}

#[async_trait]
impl Downloader for StubDownloader {
    async fn download_audio(
        &self,
        _source: &SourceReference,
        output_dir: &Path,
    ) -> Result<AcquiredAudio, AcquisitionError> {
        (self.result)(output_dir)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn downloaded_x(output_dir: &Path) -> Result<AcquiredAudio, AcquisitionError> {
    Ok(AcquiredAudio {
        local_path: output_dir.join("X.wav"),
        source_id: Some("X".to_string()),
        platform: Platform::YouTube,
    })
}

fn download_fails(_output_dir: &Path) -> Result<AcquiredAudio, AcquisitionError> {
    Err(AcquisitionError::ToolNotFound {
        name: "yt-dlp".to_string(),
    })
}

struct StubTranscriber {
    text: Option<&'static str>,
    seen: Mutex<Vec<PathBuf>>,
}

impl StubTranscriber {
    fn returning(text: &'static str) -> Self {
        Self {
            text: Some(text),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            text: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, local_path: &Path) -> Result<Transcript, TranscriptionError> {
        self.seen.lock().unwrap().push(local_path.to_path_buf());
        match self.text {
            Some(text) => Ok(Transcript::new(text)),
            None => Err(TranscriptionError::RemoteError("model unavailable".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Echoes the uploaded content back as the response body
#[derive(Default)]
struct EchoUploader {
    reject: bool,
    uploads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Uploader for EchoUploader {
    async fn upload(&self, content: &str, path: &str) -> Result<String, PublicationError> {
        self.uploads
            .lock()
            .unwrap()
            .push((content.to_string(), path.to_string()));
        if self.reject {
            return Err(PublicationError::Rejected {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(content.to_string())
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

struct Harness {
    system: Arc<RecordingSystem>,
    transcriber: Arc<StubTranscriber>,
    uploader: Arc<EchoUploader>,
    pipeline: TranscriptionPipeline,
}

fn harness(
    download: fn(&Path) -> Result<AcquiredAudio, AcquisitionError>,
    transcriber: StubTranscriber,
    uploader: EchoUploader,
) -> Harness {
    let system = Arc::new(RecordingSystem::default());
    let transcriber = Arc::new(transcriber);
    let uploader = Arc::new(uploader);

    let pipeline = TranscriptionPipeline::new(
        system.clone(),
        Arc::new(StubDownloader { result: download }),
        transcriber.clone(),
        PublicationStage::new(uploader.clone()),
        "yt-transcribe",
    );

    Harness {
        system,
        transcriber,
        uploader,
        pipeline,
    }
}

fn youtube_source() -> SourceReference {
    SourceReference::parse("https://www.youtube.com/watch?v=X").unwrap()
}

#[tokio::test]
async fn test_youtube_video_is_transcribed_and_published() {
    let h = harness(
        downloaded_x,
        StubTranscriber::returning("hello world"),
        EchoUploader::default(),
    );

    let outcome = h
        .pipeline
        .run(&youtube_source(), Path::new("/tmp"))
        .await
        .unwrap();

    assert_eq!(outcome.transcript.as_str(), "hello world");
    assert_eq!(outcome.source_id.as_deref(), Some("X"));
    assert_eq!(outcome.platform, Platform::YouTube);
    assert_eq!(outcome.target.as_str(), "yt-transcribe/youtube/X");
    assert_eq!(outcome.response.body, "hello world");

    let uploads = h.uploader.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "hello world");
    assert!(uploads[0].1.contains('X'));

    assert_eq!(
        h.transcriber.seen.lock().unwrap().clone(),
        vec![PathBuf::from("/tmp/X.wav")]
    );
    assert_eq!(h.system.removed(), vec![PathBuf::from("/tmp/X.wav")]);
}

#[tokio::test]
async fn test_transcript_without_identifier_uses_fixed_path() {
    fn downloaded_anonymous(output_dir: &Path) -> Result<AcquiredAudio, AcquisitionError> {
        Ok(AcquiredAudio {
            local_path: output_dir.join("clip.wav"),
            source_id: None,
            platform: Platform::Instagram,
        })
    }

    let h = harness(
        downloaded_anonymous,
        StubTranscriber::returning("caption"),
        EchoUploader::default(),
    );
    let source = SourceReference::parse("https://www.instagram.com/reel/abc/").unwrap();

    let outcome = h.pipeline.run(&source, Path::new("/tmp")).await.unwrap();

    assert_eq!(outcome.target.as_str(), "yt-transcribe/instagram/transcript.txt");
    assert_eq!(h.system.removed(), vec![PathBuf::from("/tmp/clip.wav")]);
}

#[tokio::test]
async fn test_acquisition_failure_skips_later_stages() {
    let h = harness(
        download_fails,
        StubTranscriber::returning("unused"),
        EchoUploader::default(),
    );

    let err = h
        .pipeline
        .run(&youtube_source(), Path::new("/tmp"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Acquisition);
    assert!(matches!(
        err.source,
        StageError::Acquisition(AcquisitionError::ToolNotFound { .. })
    ));
    assert!(h.transcriber.seen.lock().unwrap().is_empty());
    assert!(h.uploader.uploads.lock().unwrap().is_empty());
    assert!(h.system.removed().is_empty());
}

#[tokio::test]
async fn test_transcription_failure_still_removes_audio_once() {
    let h = harness(
        downloaded_x,
        StubTranscriber::failing(),
        EchoUploader::default(),
    );

    let err = h
        .pipeline
        .run(&youtube_source(), Path::new("/tmp"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Transcription);
    assert!(err.to_string().starts_with("transcription stage failed"));
    assert!(h.uploader.uploads.lock().unwrap().is_empty());
    assert_eq!(h.system.removed(), vec![PathBuf::from("/tmp/X.wav")]);
}

#[tokio::test]
async fn test_publication_failure_still_removes_audio_once() {
    let h = harness(
        downloaded_x,
        StubTranscriber::returning("hello world"),
        EchoUploader {
            reject: true,
            ..Default::default()
        },
    );

    let err = h
        .pipeline
        .run(&youtube_source(), Path::new("/tmp"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Publication);
    assert!(matches!(
        err.source,
        StageError::Publication(PublicationError::Rejected { status: 500, .. })
    ));
    assert_eq!(h.uploader.uploads.lock().unwrap().len(), 1);
    assert_eq!(h.system.removed(), vec![PathBuf::from("/tmp/X.wav")]);
}

#[tokio::test]
async fn test_transcript_mirrored_before_upload() {
    let mirror = tempfile::tempdir().unwrap();
    let system = Arc::new(RecordingSystem::default());
    let uploader = Arc::new(EchoUploader::default());

    let pipeline = TranscriptionPipeline::new(
        system.clone(),
        Arc::new(StubDownloader {
            result: downloaded_x,
        }),
        Arc::new(StubTranscriber::returning("hello world")),
        PublicationStage::new(uploader.clone()).with_mirror_dir(mirror.path()),
        "yt-transcribe",
    );

    pipeline
        .run(&youtube_source(), Path::new("/tmp"))
        .await
        .unwrap();

    let copy = std::fs::read_to_string(mirror.path().join("yt-transcribe/youtube/X")).unwrap();
    assert_eq!(copy, "hello world");
}
