use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{SpeechToText, SpeechToTextError};
use crate::domain::{AUDIO_FILE_NAME, AUDIO_MIME_TYPE};

/// Whisper-compatible HTTP speech-to-text provider. The recognition hint is
/// forwarded as the `prompt` field to bias proper-noun accuracy.
pub struct WhisperApiEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionBody {
    text: String,
}

impl WhisperApiEngine {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: model.unwrap_or_else(|| "whisper-1".to_string()),
            language,
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperApiEngine {
    async fn transcribe(&self, audio: &[u8], hint: &str) -> Result<String, SpeechToTextError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio.to_vec())
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME_TYPE)
            .map_err(|e| SpeechToTextError::ApiRequestFailed(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .text("temperature", "0")
            .part("file", file_part);

        if !hint.is_empty() {
            form = form.text("prompt", hint.to_string());
        }
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        tracing::debug!(model = %self.model, "Sending audio to speech-to-text API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechToTextError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SpeechToTextError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body: TranscriptionBody = response
            .json()
            .await
            .map_err(|e| SpeechToTextError::MalformedResponse(e.to_string()))?;

        tracing::info!(chars = body.text.len(), "Transcription completed");

        Ok(body.text.trim().to_string())
    }
}
