mod asr;
mod detect_language;
mod health;

use serde::Serialize;

pub use asr::{asr_handler, AsrRequest, AsrResponse};
pub use detect_language::{
    detect_language_handler, DetectLanguageRequest, DetectLanguageResponse,
};
pub use health::{health_handler, HealthResponse};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
