use crate::domain::AudioArtifact;

/// Advisory fractional progress in [0, 1]; no monotonicity guarantee.
pub type ProgressFn<'a> = &'a (dyn Fn(f32) + Send + Sync);

#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    /// Demux the video container, select its first audio stream, and encode
    /// it to a low-bitrate compressed artifact. No partial artifact is
    /// produced on failure.
    async fn extract_audio(
        &self,
        video: &[u8],
        progress: ProgressFn<'_>,
    ) -> Result<AudioArtifact, TranscodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("engine initialization failed: {0}")]
    EngineInit(String),
    #[error("container could not be demuxed: {0}")]
    Demux(String),
    #[error("no audio stream in container")]
    NoAudioStream,
    #[error("audio encoding failed: {0}")]
    Encode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
