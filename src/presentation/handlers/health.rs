use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::ports::{AudioDecoder, AudioFetcher, SpeechModel};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

pub async fn health_handler<F, D, M>(
    State(state): State<AppState<F, D, M>>,
) -> impl IntoResponse
where
    F: AudioFetcher + 'static,
    D: AudioDecoder + 'static + ?Sized,
    M: SpeechModel + 'static,
{
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            model: state.model_name,
        }),
    )
}
