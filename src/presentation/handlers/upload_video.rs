use std::io;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::ports::{MediaStore, SpeechToText};
use crate::application::services::{IngestError, MISSING_FILE_MESSAGE};
use crate::domain::Video;
use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub name: String,
    pub path: String,
    pub created_at: String,
}

impl From<&Video> for VideoResponse {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.to_string(),
            name: video.name.clone(),
            path: video.path.clone(),
            created_at: video.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub video: VideoResponse,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_video_handler<S, M>(
    State(state): State<AppState<S, M>>,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    S: SpeechToText + 'static,
    M: MediaStore + 'static,
{
    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Upload request with no file part");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: MISSING_FILE_MESSAGE.to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                e.status(),
                Json(ErrorResponse {
                    error: format!("Failed to read multipart: {}", e),
                }),
            )
                .into_response();
        }
    };

    let filename = match field.file_name() {
        Some(name) => name.to_string(),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: MISSING_FILE_MESSAGE.to_string(),
                }),
            )
                .into_response();
        }
    };

    let stream = futures::stream::try_unfold(field, |mut field| async move {
        match field.chunk().await {
            Ok(Some(bytes)) => Ok(Some((bytes, field))),
            Ok(None) => Ok(None),
            Err(e) => Err(io::Error::other(e)),
        }
    });

    match state
        .ingestion_service
        .ingest(&filename, Box::pin(stream))
        .await
    {
        Ok(video) => (
            StatusCode::OK,
            Json(UploadResponse {
                video: (&video).into(),
            }),
        )
            .into_response(),
        Err(e @ IngestError::InvalidExtension) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Upload ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Upload failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}
