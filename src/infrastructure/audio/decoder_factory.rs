use std::str::FromStr;
use std::sync::Arc;

use crate::application::ports::AudioDecoder;

use super::ffmpeg_decoder::FfmpegDecoder;
use super::symphonia_decoder::SymphoniaDecoder;

/// Which decoding implementation backs the `AudioDecoder` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderBackend {
    Ffmpeg,
    Symphonia,
}

impl FromStr for DecoderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ffmpeg" => Ok(Self::Ffmpeg),
            "symphonia" => Ok(Self::Symphonia),
            other => Err(format!(
                "invalid decoder backend: {}. Expected: ffmpeg or symphonia",
                other
            )),
        }
    }
}

pub struct AudioDecoderFactory;

impl AudioDecoderFactory {
    pub fn create(backend: DecoderBackend) -> Arc<dyn AudioDecoder> {
        match backend {
            DecoderBackend::Ffmpeg => Arc::new(FfmpegDecoder::new()),
            DecoderBackend::Symphonia => Arc::new(SymphoniaDecoder),
        }
    }
}
