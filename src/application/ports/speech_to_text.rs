use async_trait::async_trait;

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Convert audio to text. `hint` biases recognition, e.g. a
    /// comma-separated keyword list for proper-noun accuracy.
    async fn transcribe(&self, audio: &[u8], hint: &str) -> Result<String, SpeechToTextError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechToTextError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}
