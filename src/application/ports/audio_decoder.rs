use async_trait::async_trait;

use crate::domain::AudioSample;

/// Converts arbitrary container/codec audio bytes into a normalized 16 kHz
/// mono waveform.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    async fn decode(&self, data: &[u8]) -> Result<AudioSample, DecodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Decoding ran but failed; the message carries the decoder's own
    /// diagnostic output.
    #[error("audio decoding failed: {0}")]
    Failed(String),
    #[error("decoder unavailable: {0}")]
    Unavailable(String),
}
