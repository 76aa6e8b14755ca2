use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;

use super::Uploader;
use crate::credentials::{require_key, CredentialProvider};
use crate::error::PublicationError;

/// Uploads transcripts to a Vercel Blob API endpoint
pub struct VercelBlobUploader {
    client: reqwest::Client,
    api_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl VercelBlobUploader {
    pub fn new(api_url: &str, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, credentials)
    }

    pub fn with_client(
        client: reqwest::Client,
        api_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            credentials,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}?blob_path={}", self.api_url, urlencoding::encode(path))
    }
}

#[async_trait]
impl Uploader for VercelBlobUploader {
    async fn upload(&self, content: &str, path: &str) -> Result<String, PublicationError> {
        let token = require_key(self.credentials.as_ref())
            .map_err(PublicationError::MissingCredential)?;

        let part = reqwest::multipart::Part::text(content.to_string()).file_name(path.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url(path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublicationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PublicationError::Transport(format!("failed to read response body: {}", e)))?;

        if status != StatusCode::OK {
            return Err(PublicationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn name(&self) -> &'static str {
        "vercel-blob"
    }
}
