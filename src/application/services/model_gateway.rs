use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{MelExtractor, ModelError, SpeechModel};
use crate::domain::{
    best_language, AudioSample, TranscriptionOptions, TranscriptionResult, SAMPLE_RATE,
};

/// Fixed analysis window for language detection: 30 seconds at 16 kHz.
pub const DETECTION_WINDOW_SAMPLES: usize = 30 * SAMPLE_RATE as usize;

/// Owns the one loaded model instance and serializes every inference call
/// behind a single mutex. The model's internal compute state is not safe for
/// concurrent use, so at most one inference is in flight process-wide;
/// concurrent requests queue on the lock.
///
/// The mel extractor is split off at construction so spectrogram work never
/// queues on the inference lock.
///
/// Constructed once at startup and shared by reference with the request
/// handlers.
pub struct ModelGateway<M: SpeechModel> {
    mel_extractor: Arc<dyn MelExtractor>,
    model: Mutex<M>,
}

impl<M: SpeechModel> ModelGateway<M> {
    pub fn new(model: M) -> Self {
        Self {
            mel_extractor: model.mel_extractor(),
            model: Mutex::new(model),
        }
    }

    /// Runs one transcription under the lock. The guard is released on every
    /// exit path, including failure.
    pub async fn transcribe(
        &self,
        audio: &AudioSample,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, ModelError> {
        let mut model = self.model.lock().await;
        model.transcribe(audio, options)
    }

    /// Detects the spoken language and returns its code. Padding/trimming and
    /// the mel spectrogram happen before the lock is taken; only the decoder
    /// pass itself is serialized.
    ///
    /// Equal maximal probabilities are broken deterministically toward the
    /// lexicographically smallest code.
    pub async fn detect_language(&self, audio: &AudioSample) -> Result<String, ModelError> {
        let window = audio.pad_or_trim(DETECTION_WINDOW_SAMPLES);
        let mel = self.mel_extractor.log_mel(&window)?;

        let scores = {
            let mut model = self.model.lock().await;
            model.detect_language(&mel)?
        };

        best_language(&scores)
            .map(|score| score.code.clone())
            .ok_or_else(|| ModelError::InferenceFailed("empty language score set".to_string()))
    }
}
