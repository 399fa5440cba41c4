mod decoder_factory;
mod ffmpeg_decoder;
mod symphonia_decoder;
#[cfg(test)]
pub(crate) mod test_wav;

pub use decoder_factory::{AudioDecoderFactory, DecoderBackend};
pub use ffmpeg_decoder::FfmpegDecoder;
pub use symphonia_decoder::SymphoniaDecoder;
