use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{
    AudioDecoder, AudioFetcher, DecodeError, FetchError, ModelError, SpeechModel,
};
use crate::application::services::ModelGateway;
use crate::domain::{
    language_name, AudioSample, Task, TranscriptionOptions, TranscriptionResult,
};

/// One transcription work unit inside a batch request.
#[derive(Debug, Clone)]
pub struct TranscribeItem {
    pub index: i64,
    pub task: Option<Task>,
    pub language: Option<String>,
    pub audio_url: String,
    pub encode: bool,
}

/// One language-detection work unit inside a batch request.
#[derive(Debug, Clone)]
pub struct DetectItem {
    pub index: i64,
    pub audio_url: String,
    pub encode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageDetection {
    pub detected_language: String,
    pub language_code: String,
}

/// Per-item pipeline (fetch, decode, infer) plus batch fan-out. Items of one
/// batch run strictly sequentially in listed order; the first failure aborts
/// the remaining items, so callers get all results or none.
pub struct SpeechService<F, D: ?Sized, M>
where
    F: AudioFetcher,
    D: AudioDecoder,
    M: SpeechModel,
{
    fetcher: Arc<F>,
    decoder: Arc<D>,
    gateway: Arc<ModelGateway<M>>,
}

impl<F, D: ?Sized, M> SpeechService<F, D, M>
where
    F: AudioFetcher,
    D: AudioDecoder,
    M: SpeechModel,
{
    pub fn new(fetcher: Arc<F>, decoder: Arc<D>, gateway: Arc<ModelGateway<M>>) -> Self {
        Self {
            fetcher,
            decoder,
            gateway,
        }
    }

    /// Fetches one URL and produces a normalized waveform. With
    /// `encode = false` decoding is skipped and the bytes are assumed to
    /// already be raw s16le PCM at 16 kHz mono; that layout is a caller
    /// contract and is not validated.
    async fn load_audio(&self, url: &str, encode: bool) -> Result<AudioSample, SpeechServiceError> {
        let bytes = self.fetcher.fetch(url).await?;

        let audio = if encode {
            self.decoder.decode(&bytes).await?
        } else {
            AudioSample::from_pcm_s16le(&bytes)
        };

        tracing::debug!(
            url,
            encode,
            samples = audio.len(),
            duration_secs = audio.duration_secs(),
            "Audio loaded"
        );

        Ok(audio)
    }

    pub async fn transcribe_batch(
        &self,
        items: &[TranscribeItem],
    ) -> Result<Vec<(i64, TranscriptionResult)>, SpeechServiceError> {
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let audio = self.load_audio(&item.audio_url, item.encode).await?;
            let options = TranscriptionOptions {
                task: item.task.unwrap_or(Task::Transcribe),
                language: item.language.clone(),
            };
            let result = self.gateway.transcribe(&audio, &options).await?;

            tracing::debug!(
                index = item.index,
                task = %options.task,
                chars = result.text.len(),
                "Batch item transcribed"
            );

            results.push((item.index, result));
        }

        Ok(results)
    }

    pub async fn detect_language_batch(
        &self,
        items: &[DetectItem],
    ) -> Result<Vec<(i64, LanguageDetection)>, SpeechServiceError> {
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let audio = self.load_audio(&item.audio_url, item.encode).await?;
            let code = self.gateway.detect_language(&audio).await?;

            // Codes outside the static table fall back to echoing the code.
            let name = language_name(&code)
                .map(str::to_string)
                .unwrap_or_else(|| code.clone());

            tracing::debug!(index = item.index, language = %code, "Batch item detected");

            results.push((
                item.index,
                LanguageDetection {
                    detected_language: name,
                    language_code: code,
                },
            ));
        }

        Ok(results)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechServiceError {
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("model: {0}")]
    Model(#[from] ModelError),
}
