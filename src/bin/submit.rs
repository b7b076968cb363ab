use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use clipscribe::client::{StageDeadlines, UploadClient, UploadPipeline, VideoFile};
use clipscribe::infrastructure::media::{FfmpegConfig, FfmpegTranscoder};

/// Upload a video and request a prompt-guided transcription.
#[derive(Parser)]
#[command(name = "clipscribe-submit")]
struct Args {
    /// Video file to submit
    file: PathBuf,

    /// Recognition keywords mentioned in the video, comma separated
    #[arg(short, long)]
    prompt: String,

    /// Server base URL
    #[arg(long, default_value = "http://localhost:3333")]
    server: String,

    /// Seconds allowed per pipeline stage; 0 leaves stages unbounded
    #[arg(long, default_value_t = 300)]
    stage_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let bytes = tokio::fs::read(&args.file).await?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string());

    let deadlines = if args.stage_timeout == 0 {
        StageDeadlines::default()
    } else {
        let limit = Duration::from_secs(args.stage_timeout);
        StageDeadlines {
            transcode: Some(limit),
            upload: Some(limit),
            transcribe: Some(limit),
        }
    };

    let transcoder = Arc::new(FfmpegTranscoder::new(FfmpegConfig::default()));
    let upload_client = UploadClient::new(reqwest::Client::new(), &args.server);
    let (pipeline, mut events) = UploadPipeline::new(transcoder, upload_client, deadlines);

    pipeline.select_file(VideoFile {
        name,
        bytes: bytes.into(),
    });

    let printer = tokio::spawn(async move {
        while let Some(status) = events.recv().await {
            println!("status: {}", status.label());
        }
    });

    let outcome = pipeline.submit(&args.prompt).await;
    drop(pipeline);
    printer.await?;

    match outcome? {
        Some(result) => {
            println!("video id: {}", result.video.id);
            println!("transcript:\n{}", result.transcription.transcript);
        }
        None => println!("nothing to do: select a file and a non-empty prompt"),
    }

    Ok(())
}
