use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ports::{MediaStore, SpeechToText};
use crate::application::services::TranscribeError;
use crate::domain::{Transcription, VideoId};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct CreateTranscriptionRequest {
    pub prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    pub video_id: String,
    pub prompt: String,
    pub transcript: String,
}

impl From<&Transcription> for TranscriptionResponse {
    fn from(t: &Transcription) -> Self {
        Self {
            video_id: t.video_id.to_string(),
            prompt: t.prompt.clone(),
            transcript: t.transcript.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct CreateTranscriptionResponse {
    pub transcription: TranscriptionResponse,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, request))]
pub async fn create_transcription_handler<S, M>(
    State(state): State<AppState<S, M>>,
    Path(video_id): Path<String>,
    Json(request): Json<CreateTranscriptionRequest>,
) -> impl IntoResponse
where
    S: SpeechToText + 'static,
    M: MediaStore + 'static,
{
    let id = match VideoId::parse(&video_id) {
        Some(id) => id,
        None => return video_not_found(&video_id),
    };

    match state
        .transcription_service
        .transcribe(id, &request.prompt)
        .await
    {
        Ok(transcription) => (
            StatusCode::OK,
            Json(CreateTranscriptionResponse {
                transcription: (&transcription).into(),
            }),
        )
            .into_response(),
        Err(TranscribeError::VideoNotFound(_)) => video_not_found(&video_id),
        Err(e @ TranscribeError::Provider(_)) => {
            tracing::error!(error = %e, "Speech-to-text provider failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Transcription failed: {}", e),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Transcription failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Transcription failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

fn video_not_found(video_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Video not found: {}", video_id),
        }),
    )
        .into_response()
}
