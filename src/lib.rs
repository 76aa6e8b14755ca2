//! yt-transcribe - download audio from a video URL, transcribe it, and publish
//! the transcript to blob storage.
//!
//! The stages are pluggable: a [`Downloader`] produces a local audio file, a
//! [`Transcriber`] turns it into text, and an [`Uploader`] stores the text.
//! [`TranscriptionPipeline`] sequences them and owns the downloaded file.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod parser;
pub mod pipeline;
pub mod process;
pub mod publish;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Config, TranscriptionBackend};
pub use credentials::{CredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
pub use error::{
    AcquisitionError, ParseError, PipelineError, PublicationError, Stage, StageError,
    TranscriptionError,
};
pub use extractors::{AcquiredAudio, Downloader, Platform, SourceReference};
pub use parser::OutputParser;
pub use pipeline::{PipelineOutcome, PipelineState, TranscriptionPipeline};
pub use process::{HostSystem, System, ToolOutput};
pub use publish::{PublicationStage, UploadResponse, UploadTarget, Uploader};
pub use transcribe::{Transcriber, Transcript};

/// Result type used by the CLI and configuration layers
pub type Result<T> = anyhow::Result<T>;
