use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ports::{AudioDecoder, AudioFetcher, SpeechModel};
use crate::application::services::{DetectItem, LanguageDetection};
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct DetectLanguageRequest {
    pub data: Vec<DetectLanguageItem>,
}

/// Positional line item: `[index, audio_file, encode]`.
#[derive(Deserialize)]
pub struct DetectLanguageItem(i64, String, bool);

#[derive(Serialize)]
pub struct DetectLanguageResponse {
    pub data: Vec<(i64, LanguageDetection)>,
}

/// `POST /detect-language`: detect the spoken language for a batch of audio
/// URLs. Same batch semantics as `/asr`: ordered results, all-or-nothing.
#[tracing::instrument(skip(state, request), fields(items = request.data.len()))]
pub async fn detect_language_handler<F, D, M>(
    State(state): State<AppState<F, D, M>>,
    Json(request): Json<DetectLanguageRequest>,
) -> impl IntoResponse
where
    F: AudioFetcher + 'static,
    D: AudioDecoder + 'static + ?Sized,
    M: SpeechModel + 'static,
{
    let items: Vec<DetectItem> = request
        .data
        .into_iter()
        .map(|DetectLanguageItem(index, audio_url, encode)| DetectItem {
            index,
            audio_url,
            encode,
        })
        .collect();

    match state.speech_service.detect_language_batch(&items).await {
        Ok(data) => {
            tracing::info!(items = data.len(), "Language detection batch completed");
            (StatusCode::OK, Json(DetectLanguageResponse { data })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Language detection batch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("language detection failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}
