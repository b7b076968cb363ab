use std::path::Path;
use std::process::Stdio;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};

use crate::application::ports::{ProgressFn, TranscodeError, Transcoder};
use crate::domain::AudioArtifact;

const INPUT_FILE_NAME: &str = "input.mp4";
const OUTPUT_FILE_NAME: &str = "output.mp3";

#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub audio_bitrate: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            audio_bitrate: "20k".to_string(),
        }
    }
}

struct Engine {
    ffmpeg: String,
    ffprobe: String,
}

/// Audio extractor backed by ffmpeg subprocesses. Binary resolution is
/// verified once per transcoder and reused across calls; encode runs are
/// serialized because each call owns the engine's scratch workspace for its
/// full duration.
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
    engine: OnceCell<Engine>,
    guard: Mutex<()>,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegConfig) -> Self {
        Self {
            config,
            engine: OnceCell::new(),
            guard: Mutex::new(()),
        }
    }

    async fn engine(&self) -> Result<&Engine, TranscodeError> {
        self.engine
            .get_or_try_init(|| async {
                verify_binary(&self.config.ffmpeg_bin).await?;
                verify_binary(&self.config.ffprobe_bin).await?;
                tracing::debug!(
                    ffmpeg = %self.config.ffmpeg_bin,
                    ffprobe = %self.config.ffprobe_bin,
                    "Transcoding engine initialized"
                );
                Ok(Engine {
                    ffmpeg: self.config.ffmpeg_bin.clone(),
                    ffprobe: self.config.ffprobe_bin.clone(),
                })
            })
            .await
    }
}

#[async_trait::async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_audio(
        &self,
        video: &[u8],
        progress: ProgressFn<'_>,
    ) -> Result<AudioArtifact, TranscodeError> {
        let _guard = self.guard.lock().await;
        let engine = self.engine().await?;

        let workspace = tempfile::tempdir()?;
        let input = workspace.path().join(INPUT_FILE_NAME);
        let output = workspace.path().join(OUTPUT_FILE_NAME);
        tokio::fs::write(&input, video).await?;

        let probe = probe_container(&engine.ffprobe, &input).await?;
        if !probe.has_audio {
            return Err(TranscodeError::NoAudioStream);
        }

        run_encode(
            &engine.ffmpeg,
            &input,
            &output,
            &self.config.audio_bitrate,
            probe.duration_us,
            progress,
        )
        .await?;

        let bytes = tokio::fs::read(&output).await?;
        tracing::info!(bytes = bytes.len(), "Audio track extracted and encoded");
        Ok(AudioArtifact::new(Bytes::from(bytes)))
    }
}

async fn verify_binary(bin: &str) -> Result<(), TranscodeError> {
    let status = Command::new(bin)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| TranscodeError::EngineInit(format!("{}: {}", bin, e)))?;

    if !status.success() {
        return Err(TranscodeError::EngineInit(format!(
            "{} exited with {}",
            bin, status
        )));
    }
    Ok(())
}

struct ContainerProbe {
    duration_us: Option<u64>,
    has_audio: bool,
}

async fn probe_container(ffprobe: &str, input: &Path) -> Result<ContainerProbe, TranscodeError> {
    let format = Command::new(ffprobe)
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(input)
        .output()
        .await?;

    if !format.status.success() {
        let stderr = String::from_utf8_lossy(&format.stderr);
        return Err(TranscodeError::Demux(stderr.trim().to_string()));
    }

    let duration_us = String::from_utf8_lossy(&format.stdout)
        .trim()
        .parse::<f64>()
        .ok()
        .map(|secs| (secs * 1_000_000.0) as u64);

    let streams = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=codec_type",
            "-of",
            "csv=p=0",
        ])
        .arg(input)
        .output()
        .await?;

    let has_audio = streams.status.success()
        && String::from_utf8_lossy(&streams.stdout).contains("audio");

    Ok(ContainerProbe {
        duration_us,
        has_audio,
    })
}

async fn run_encode(
    ffmpeg: &str,
    input: &Path,
    output: &Path,
    bitrate: &str,
    duration_us: Option<u64>,
    progress: ProgressFn<'_>,
) -> Result<(), TranscodeError> {
    let args = build_transcode_args(input, output, bitrate);

    let mut child = Command::new(ffmpeg)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TranscodeError::Encode(format!("failed to start ffmpeg: {}", e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| TranscodeError::Encode("failed to capture ffmpeg stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| TranscodeError::Encode("failed to capture ffmpeg stderr".to_string()))?;

    let stderr_task = tokio::spawn(async move {
        let mut buf = String::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_string(&mut buf).await;
        buf
    });

    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        if let (Some(out_time_us), Some(total_us)) = (parse_progress_line(&line), duration_us) {
            progress(progress_fraction(out_time_us, total_us));
        }
    }

    let status = child.wait().await?;
    let stderr_text = stderr_task.await.unwrap_or_default();

    if !status.success() {
        if stderr_text.contains("matches no streams") {
            return Err(TranscodeError::NoAudioStream);
        }
        let tail: String = stderr_text
            .lines()
            .rev()
            .take(3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TranscodeError::Encode(tail));
    }

    progress(1.0);
    Ok(())
}

fn build_transcode_args(input: &Path, output: &Path, bitrate: &str) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-map".to_string(),
        "0:a:0".to_string(),
        "-b:a".to_string(),
        bitrate.to_string(),
        "-acodec".to_string(),
        "libmp3lame".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// ffmpeg `-progress` lines are `key=value`; out_time_us and out_time_ms
/// both carry microseconds.
fn parse_progress_line(line: &str) -> Option<u64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => value.parse().ok(),
        _ => None,
    }
}

fn progress_fraction(out_time_us: u64, duration_us: u64) -> f32 {
    if duration_us == 0 {
        return 0.0;
    }
    (out_time_us as f64 / duration_us as f64).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcode_args_select_first_audio_stream_at_20k() {
        let args = build_transcode_args(Path::new("input.mp4"), Path::new("output.mp3"), "20k");
        let joined = args.join(" ");
        assert!(joined.contains("-map 0:a:0"));
        assert!(joined.contains("-b:a 20k"));
        assert!(joined.contains("-acodec libmp3lame"));
        assert!(joined.ends_with("output.mp3"));
    }

    #[test]
    fn progress_line_with_out_time_is_parsed() {
        assert_eq!(parse_progress_line("out_time_us=1500000"), Some(1_500_000));
        assert_eq!(parse_progress_line("out_time_ms=1500000"), Some(1_500_000));
    }

    #[test]
    fn unrelated_progress_lines_are_ignored() {
        assert_eq!(parse_progress_line("frame=42"), None);
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("garbage"), None);
    }

    #[test]
    fn fraction_is_clamped_to_unit_interval() {
        assert_eq!(progress_fraction(500_000, 1_000_000), 0.5);
        assert_eq!(progress_fraction(2_000_000, 1_000_000), 1.0);
        assert_eq!(progress_fraction(0, 0), 0.0);
    }
}
