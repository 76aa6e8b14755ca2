use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::TranscriptionBackend;

#[derive(Parser)]
#[command(
    name = "yt-transcribe",
    about = "Download audio from a video URL, transcribe it, and publish the transcript to blob storage",
    version,
    long_about = "Downloads the audio track of a YouTube or Instagram video with yt-dlp, transcribes it with whisper.cpp, Ollama or an OpenAI-compatible API, and uploads the transcript to a Vercel Blob store."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, transcribe and upload one video
    Transcribe {
        /// Video URL to download audio from
        #[arg(value_name = "URL")]
        url: String,

        /// Directory to save downloaded audio (system temp dir if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Transcription backend (defaults to the configured one)
        #[arg(short, long, value_enum)]
        backend: Option<TranscriptionBackend>,

        /// whisper.cpp model file
        #[arg(long, value_name = "FILE", env = "WHISPER_MODEL_PATH")]
        model: Option<PathBuf>,

        /// Also save the transcript under this directory
        #[arg(long, value_name = "DIR")]
        transcript_dir: Option<PathBuf>,

        /// Summary format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported platforms
    Platforms,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Human readable summary
    Text,
    /// JSON with transcript and upload response
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
