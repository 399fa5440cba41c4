mod model_gateway;
mod speech_service;

pub use model_gateway::{ModelGateway, DETECTION_WINDOW_SAMPLES};
pub use speech_service::{
    DetectItem, LanguageDetection, SpeechService, SpeechServiceError, TranscribeItem,
};
