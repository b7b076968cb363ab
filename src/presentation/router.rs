use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{MediaStore, SpeechToText};
use crate::application::services::MAX_UPLOAD_BYTES;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_transcription_handler, health_handler, prompts_handler, upload_video_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<S, M>(state: AppState<S, M>) -> Router
where
    S: SpeechToText + 'static,
    M: MediaStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/videos", post(upload_video_handler::<S, M>))
        .route(
            "/videos/{video_id}/transcription",
            post(create_transcription_handler::<S, M>),
        )
        .route("/prompts", get(prompts_handler::<S, M>))
        // the body cap rejects oversized uploads before handler logic runs
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
