use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{AudioDecoder, AudioFetcher, SpeechModel};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{asr_handler, detect_language_handler, health_handler};
use crate::presentation::state::AppState;

pub fn create_router<F, D, M>(state: AppState<F, D, M>) -> Router
where
    F: AudioFetcher + 'static,
    D: AudioDecoder + 'static + ?Sized,
    M: SpeechModel + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler::<F, D, M>))
        .route("/asr", post(asr_handler::<F, D, M>))
        .route("/detect-language", post(detect_language_handler::<F, D, M>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
