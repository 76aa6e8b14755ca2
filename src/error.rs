//! Error types for the acquisition, transcription and publication stages.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to recover a structured field from raw tool output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no identifier found in tool output")]
    NoIdentifierFound,

    #[error("no destination line found in tool output")]
    NoDestinationFound,
}

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("{name} not found in PATH")]
    ToolNotFound { name: String },

    #[error("{tool} failed ({exit}):\n{output}")]
    ProcessFailed {
        tool: String,
        exit: String,
        output: String,
    },

    #[error("download reported success, but file not found at expected path: {}", expected_path.display())]
    ArtifactMissing { expected_path: PathBuf },

    #[error("could not read tool output: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("{name} not found in PATH")]
    ToolNotFound { name: String },

    #[error("{tool} failed ({exit}):\n{output}")]
    ProcessFailed {
        tool: String,
        exit: String,
        output: String,
    },

    #[error("failed to read transcript file {}", path.display())]
    OutputUnreadable { path: PathBuf },

    #[error("remote transcription failed: {0}")]
    RemoteError(String),

    #[error("API key not provided ({0})")]
    MissingCredential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PublicationError {
    #[error("upload token not provided ({0})")]
    MissingCredential(String),

    #[error("failed to send upload request: {0}")]
    Transport(String),

    #[error("upload failed with status code {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to save transcript copy to {}: {source}", path.display())]
    Mirror {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquisition,
    Transcription,
    Publication,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Acquisition => write!(f, "acquisition"),
            Stage::Transcription => write!(f, "transcription"),
            Stage::Publication => write!(f, "publication"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Publication(#[from] PublicationError),
}

/// A stage failure tagged with the stage it came from
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_display() {
        let error = AcquisitionError::ToolNotFound {
            name: "ffmpeg".to_string(),
        };
        assert_eq!(error.to_string(), "ffmpeg not found in PATH");
    }

    #[test]
    fn test_artifact_missing_display() {
        let error = AcquisitionError::ArtifactMissing {
            expected_path: PathBuf::from("/out/abc.wav"),
        };
        assert!(error.to_string().ends_with("/out/abc.wav"));
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        let error = PipelineError::new(
            Stage::Transcription,
            TranscriptionError::RemoteError("boom".to_string()),
        );
        assert_eq!(error.stage, Stage::Transcription);
        assert_eq!(
            error.to_string(),
            "transcription stage failed: remote transcription failed: boom"
        );
    }

    #[test]
    fn test_parse_error_converts_into_acquisition_error() {
        let error: AcquisitionError = ParseError::NoIdentifierFound.into();
        assert!(matches!(
            error,
            AcquisitionError::Parse(ParseError::NoIdentifierFound)
        ));
    }
}
