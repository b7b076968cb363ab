use super::VideoId;

/// Prompt-guided transcript, owned 1:1 by its video.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub video_id: VideoId,
    pub prompt: String,
    pub transcript: String,
}

impl Transcription {
    pub fn new(video_id: VideoId, prompt: String, transcript: String) -> Self {
        Self {
            video_id,
            prompt,
            transcript,
        }
    }
}
