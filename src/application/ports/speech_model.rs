use std::sync::Arc;

use crate::domain::{
    AudioSample, LanguageScore, MelSpectrogram, TranscriptionOptions, TranscriptionResult,
};

/// The loaded speech-recognition model. Implementations carry mutable
/// inference state (kv caches, compute buffers) and are NOT safe for
/// concurrent calls; all access goes through the [`ModelGateway`] mutex.
///
/// [`ModelGateway`]: crate::application::services::ModelGateway
pub trait SpeechModel: Send {
    fn transcribe(
        &mut self,
        audio: &AudioSample,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, ModelError>;

    /// Spectrogram front end for language detection. The returned extractor
    /// shares only immutable model state, so callers can compute mels while
    /// another inference holds the model lock.
    fn mel_extractor(&self) -> Arc<dyn MelExtractor>;

    /// Likelihood per language code for a prepared 30-second mel window.
    fn detect_language(&mut self, mel: &MelSpectrogram) -> Result<Vec<LanguageScore>, ModelError>;
}

/// Converts PCM audio into the log-mel spectrogram the model consumes.
pub trait MelExtractor: Send + Sync {
    fn log_mel(&self, audio: &AudioSample) -> Result<MelSpectrogram, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("unknown language code: {0}")]
    UnknownLanguage(String),
    #[error("language detection unsupported: {0}")]
    DetectionUnsupported(String),
}
