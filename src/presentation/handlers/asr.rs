use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ports::{AudioDecoder, AudioFetcher, SpeechModel};
use crate::application::services::TranscribeItem;
use crate::domain::{Task, TranscriptionResult};
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct AsrRequest {
    pub data: Vec<AsrItem>,
}

/// Positional line item: `[index, task, language, audio_file, encode]`.
#[derive(Deserialize)]
pub struct AsrItem(i64, Option<Task>, Option<String>, String, bool);

#[derive(Serialize)]
pub struct AsrResponse {
    pub data: Vec<(i64, TranscriptionResult)>,
}

/// `POST /asr`: transcribe (or translate) a batch of audio URLs. Results
/// come back in the same order as the request items; any item failure fails
/// the whole batch.
#[tracing::instrument(skip(state, request), fields(items = request.data.len()))]
pub async fn asr_handler<F, D, M>(
    State(state): State<AppState<F, D, M>>,
    Json(request): Json<AsrRequest>,
) -> impl IntoResponse
where
    F: AudioFetcher + 'static,
    D: AudioDecoder + 'static + ?Sized,
    M: SpeechModel + 'static,
{
    let items: Vec<TranscribeItem> = request
        .data
        .into_iter()
        .map(|AsrItem(index, task, language, audio_url, encode)| TranscribeItem {
            index,
            task,
            language,
            audio_url,
            encode,
        })
        .collect();

    match state.speech_service.transcribe_batch(&items).await {
        Ok(data) => {
            tracing::info!(items = data.len(), "Transcription batch completed");
            (StatusCode::OK, Json(AsrResponse { data })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Transcription batch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("transcription failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}
