use bytes::Bytes;

pub const AUDIO_FILE_NAME: &str = "audio.mp3";
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Compressed audio produced by the transcoder, ready for upload. The
/// logical filename and MIME type are fixed regardless of the source video.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    pub bytes: Bytes,
    pub file_name: &'static str,
    pub content_type: &'static str,
}

impl AudioArtifact {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            bytes,
            file_name: AUDIO_FILE_NAME,
            content_type: AUDIO_MIME_TYPE,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
