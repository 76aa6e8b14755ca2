use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcribe::credentials::require_key;
use yt_transcribe::extractors::YtDlpDownloader;
use yt_transcribe::publish::VercelBlobUploader;
use yt_transcribe::transcribe::{OllamaTranscriber, OpenAiTranscriber, WhisperCppTranscriber};
use yt_transcribe::{
    utils, Cli, Commands, Config, EnvCredentialProvider, HostSystem, OutputFormat,
    PipelineOutcome, PublicationStage, SourceReference, System, Transcriber,
    TranscriptionBackend, TranscriptionPipeline,
};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let cli = Cli::parse();
    let default_filter = if cli.verbose {
        "yt_transcribe=debug"
    } else {
        "yt_transcribe=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if !dotenv_loaded {
        tracing::debug!("No .env file found; using process environment only");
    }

    let quiet = cli.quiet;

    match cli.command {
        Commands::Transcribe {
            url,
            output,
            backend,
            model,
            transcript_dir,
            format,
        } => {
            let source = SourceReference::parse(&url)?;
            let system: Arc<dyn System> = Arc::new(HostSystem);

            // Check for required external dependencies (non-fatal, the chosen backend may not need them)
            let missing_deps = utils::check_dependencies(system.as_ref());
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
            }

            let mut config = Config::load().await?;
            if let Some(model) = model {
                config.transcription.whisper_model_path = Some(model);
            }
            let backend = backend.unwrap_or(config.transcription.backend);
            config.validate(backend)?;

            let blob_credentials = Arc::new(EnvCredentialProvider::new(&config.blob.token_env));
            require_key(blob_credentials.as_ref()).map_err(|hint| {
                anyhow::anyhow!("Blob upload token not configured: {}", hint)
            })?;

            let output_dir = output
                .or_else(|| config.app.output_dir.clone())
                .unwrap_or_else(utils::default_output_dir);
            fs_err::create_dir_all(&output_dir).with_context(|| {
                format!("Error creating output directory {}", output_dir.display())
            })?;

            tracing::info!("Transcribing video from URL: {}", source);
            tracing::info!("Output directory: {}", output_dir.display());

            let transcriber = build_transcriber(&config, backend, Arc::clone(&system))?;
            let uploader = VercelBlobUploader::new(&config.blob.api_url, blob_credentials);

            let mut publisher = PublicationStage::new(Arc::new(uploader));
            if let Some(dir) = transcript_dir.or_else(|| config.app.transcript_dir.clone()) {
                publisher = publisher.with_mirror_dir(dir);
            }

            let pipeline = TranscriptionPipeline::new(
                Arc::clone(&system),
                Arc::new(YtDlpDownloader::new(Arc::clone(&system))),
                transcriber,
                publisher,
                config.app.name.clone(),
            )
            .with_progress(!quiet);

            let outcome = pipeline.run(&source, &output_dir).await?;
            print_outcome(&outcome, &format)?;
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::config_path()?.display());
            }
        }
        Commands::Platforms => {
            println!("Supported platforms:");
            println!("  • YouTube (youtube.com) - stored under <app>/youtube/<video id>");
            println!("  • Instagram (instagram.com) - stored under <app>/instagram/<video id>");
            println!("  • Any other URL yt-dlp understands - stored under <app>/other/<video id>");
            println!();
            println!("Without a video id, transcripts go to yt-transcribe/instagram/transcript.txt");
            println!("for Instagram and yt-transcribe/youtube/transcript.txt for everything else.");
        }
    }

    Ok(())
}

fn build_transcriber(
    config: &Config,
    backend: TranscriptionBackend,
    system: Arc<dyn System>,
) -> Result<Arc<dyn Transcriber>> {
    let settings = &config.transcription;

    let transcriber: Arc<dyn Transcriber> = match backend {
        TranscriptionBackend::WhisperCpp => {
            let model = settings
                .whisper_model_path
                .clone()
                .context("WHISPER_MODEL_PATH environment variable not set")?;
            Arc::new(WhisperCppTranscriber::new(system, model))
        }
        TranscriptionBackend::Ollama => Arc::new(OllamaTranscriber::new(
            &settings.ollama_host,
            &settings.ollama_model,
        )?),
        TranscriptionBackend::Openai => {
            let credentials = Arc::new(EnvCredentialProvider::new(&settings.openai_key_env));
            require_key(credentials.as_ref())
                .map_err(|hint| anyhow::anyhow!("OpenAI API key not configured: {}", hint))?;
            Arc::new(OpenAiTranscriber::new(
                &settings.openai_base_url,
                &settings.openai_model,
                credentials,
            ))
        }
    };

    Ok(transcriber)
}

fn print_outcome(outcome: &PipelineOutcome, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", console::style("--- Transcription Upload Complete ---").green().bold());
            println!("Uploaded to: {}", outcome.target);
            println!("Response from blob API:");
            println!("{}", outcome.response.body);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcome)
                .context("Failed to serialize result")?;
            println!("{}", json);
        }
    }
    Ok(())
}
