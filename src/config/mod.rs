use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transcribe::{ollama, openai};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Blob store settings
    pub blob: BlobConfig,

    /// Transcription backend settings
    pub transcription: TranscriptionConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Upload endpoint
    pub api_url: String,

    /// Environment variable holding the bearer token
    pub token_env: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptionBackend {
    /// Local whisper.cpp `whisper-cli` process
    WhisperCpp,
    /// Ollama server, streamed response
    Ollama,
    /// OpenAI-compatible transcription API
    Openai,
}

impl std::fmt::Display for TranscriptionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionBackend::WhisperCpp => write!(f, "whisper-cpp"),
            TranscriptionBackend::Ollama => write!(f, "ollama"),
            TranscriptionBackend::Openai => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Backend used when none is given on the command line
    pub backend: TranscriptionBackend,

    /// whisper.cpp model file
    pub whisper_model_path: Option<PathBuf>,

    /// Ollama server
    pub ollama_host: String,

    /// Ollama model name
    pub ollama_model: String,

    /// OpenAI-compatible API base URL
    pub openai_base_url: String,

    /// OpenAI model name
    pub openai_model: String,

    /// Environment variable holding the OpenAI API key
    pub openai_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// First segment of upload paths
    pub name: String,

    /// Directory for downloaded audio (system temp dir if not set)
    pub output_dir: Option<PathBuf>,

    /// Keep a local copy of each transcript under this directory
    pub transcript_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blob: BlobConfig {
                api_url: "".to_string(),
                token_env: "VERCEL_BLOB_API_TOKEN".to_string(),
            },
            transcription: TranscriptionConfig {
                backend: TranscriptionBackend::WhisperCpp,
                whisper_model_path: None,
                ollama_host: "http://localhost:11434".to_string(),
                ollama_model: ollama::DEFAULT_MODEL.to_string(),
                openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
                openai_model: openai::DEFAULT_MODEL.to_string(),
                openai_key_env: "OPENAI_API_KEY".to_string(),
            },
            app: AppConfig {
                name: "yt-transcribe".to_string(),
                output_dir: None,
                transcript_dir: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default, then apply
    /// environment overrides
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str(&content).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save().await?;
            config
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-transcribe").join("config.yaml"))
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty("VERCEL_BLOB_API_URL") {
            self.blob.api_url = url;
        }
        if let Some(path) = non_empty("WHISPER_MODEL_PATH") {
            self.transcription.whisper_model_path = Some(PathBuf::from(path));
        }
        if let Some(host) = non_empty("OLLAMA_HOST") {
            self.transcription.ollama_host = host;
        }
        if let Some(model) = non_empty("OLLAMA_MODEL") {
            self.transcription.ollama_model = model;
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.transcription.openai_base_url = url;
        }
    }

    /// Check the settings a transcription run needs
    pub fn validate(&self, backend: TranscriptionBackend) -> Result<()> {
        if self.blob.api_url.trim().is_empty() {
            anyhow::bail!("VERCEL_BLOB_API_URL environment variable not set (or blob.api_url in config)");
        }

        if backend == TranscriptionBackend::WhisperCpp && self.transcription.whisper_model_path.is_none() {
            anyhow::bail!("WHISPER_MODEL_PATH environment variable not set (or transcription.whisper_model_path in config)");
        }

        if self.app.name.trim().is_empty() {
            anyhow::bail!("app.name must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Blob API URL: {}", self.blob.api_url);
        println!("  Blob Token Variable: {}", self.blob.token_env);
        println!("  Backend: {}", self.transcription.backend);
        if let Some(path) = &self.transcription.whisper_model_path {
            println!("  Whisper Model: {}", path.display());
        }
        println!("  Ollama: {} ({})", self.transcription.ollama_host, self.transcription.ollama_model);
        println!("  OpenAI: {} ({})", self.transcription.openai_base_url, self.transcription.openai_model);
        println!("  App Name: {}", self.app.name);
        if let Some(dir) = &self.app.transcript_dir {
            println!("  Transcript Copies: {}", dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("backend: whisper-cpp"));

        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.app.name, "yt-transcribe");
        assert_eq!(parsed.transcription.backend, TranscriptionBackend::WhisperCpp);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("VERCEL_BLOB_API_URL", "https://blob.example.com/api/upload"),
            ("WHISPER_MODEL_PATH", "/models/ggml-base.en.bin"),
            ("OLLAMA_HOST", ""),
        ]));

        assert_eq!(config.blob.api_url, "https://blob.example.com/api/upload");
        assert_eq!(
            config.transcription.whisper_model_path,
            Some(PathBuf::from("/models/ggml-base.en.bin"))
        );
        assert_eq!(config.transcription.ollama_host, "http://localhost:11434");
    }

    #[test]
    fn test_validate_requires_blob_url() {
        let config = Config::default();
        let err = config.validate(TranscriptionBackend::Ollama).unwrap_err();
        assert!(err.to_string().contains("VERCEL_BLOB_API_URL"));
    }

    #[test]
    fn test_validate_requires_model_for_whisper_cpp() {
        let mut config = Config::default();
        config.blob.api_url = "https://blob.example.com".to_string();

        assert!(config.validate(TranscriptionBackend::WhisperCpp).is_err());
        assert!(config.validate(TranscriptionBackend::Openai).is_ok());

        config.transcription.whisper_model_path = Some(PathBuf::from("/models/m.bin"));
        assert!(config.validate(TranscriptionBackend::WhisperCpp).is_ok());
    }
}
