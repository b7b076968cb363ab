use reqwest::multipart;
use serde::Deserialize;

use crate::domain::AudioArtifact;

/// HTTP client for the ingestion and transcription endpoints. The reqwest
/// client and base URL are injected; nothing here is process-global.
pub struct UploadClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedVideo {
    pub id: String,
    pub name: String,
    pub path: String,
    pub created_at: String,
}

#[derive(Deserialize)]
struct UploadBody {
    video: UploadedVideo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    pub video_id: String,
    pub prompt: String,
    pub transcript: String,
}

#[derive(Deserialize)]
struct TranscriptionBody {
    transcription: TranscriptionResult,
}

impl UploadClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Stream the artifact as a single-file multipart body and return the
    /// Video record the server created for it.
    pub async fn upload(&self, artifact: &AudioArtifact) -> Result<UploadedVideo, UploadError> {
        let part = multipart::Part::stream_with_length(
            reqwest::Body::from(artifact.bytes.clone()),
            artifact.len() as u64,
        )
        .file_name(artifact.file_name)
        .mime_str(artifact.content_type)?;

        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/videos", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: UploadBody = response
            .json()
            .await
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

        Ok(body.video)
    }

    pub async fn request_transcription(
        &self,
        video_id: &str,
        prompt: &str,
    ) -> Result<TranscriptionResult, UploadError> {
        let response = self
            .client
            .post(format!("{}/videos/{}/transcription", self.base_url, video_id))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: TranscriptionBody = response
            .json()
            .await
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

        Ok(body.transcription)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UploadError::Status { status, body })
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed server response: {0}")]
    MalformedResponse(String),
}
