mod ffmpeg_transcoder;

pub use ffmpeg_transcoder::{FfmpegConfig, FfmpegTranscoder};
