use std::sync::Arc;

use crate::application::ports::{AudioDecoder, AudioFetcher, SpeechModel};
use crate::application::services::SpeechService;

pub struct AppState<F, D: ?Sized, M>
where
    F: AudioFetcher,
    D: AudioDecoder,
    M: SpeechModel,
{
    pub speech_service: Arc<SpeechService<F, D, M>>,
    /// Model variant name, reported by the health endpoint.
    pub model_name: String,
}

impl<F, D: ?Sized, M> Clone for AppState<F, D, M>
where
    F: AudioFetcher,
    D: AudioDecoder,
    M: SpeechModel,
{
    fn clone(&self) -> Self {
        Self {
            speech_service: Arc::clone(&self.speech_service),
            model_name: self.model_name.clone(),
        }
    }
}
