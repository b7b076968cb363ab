use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::ports::{MediaStore, SpeechToText};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct PromptResponse {
    pub id: String,
    pub title: String,
    pub template: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn prompts_handler<S, M>(State(state): State<AppState<S, M>>) -> impl IntoResponse
where
    S: SpeechToText + 'static,
    M: MediaStore + 'static,
{
    match state.prompt_repository.list().await {
        Ok(prompts) => {
            let prompts: Vec<PromptResponse> = prompts
                .iter()
                .map(|p| PromptResponse {
                    id: p.id.as_uuid().to_string(),
                    title: p.title.clone(),
                    template: p.template.clone(),
                })
                .collect();
            (StatusCode::OK, Json(prompts)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list prompts");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to list prompts: {}", e),
                }),
            )
                .into_response()
        }
    }
}
