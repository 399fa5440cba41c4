mod audio_decoder;
mod audio_fetcher;
mod speech_model;

pub use audio_decoder::{AudioDecoder, DecodeError};
pub use audio_fetcher::{AudioFetcher, FetchError};
pub use speech_model::{MelExtractor, ModelError, SpeechModel};
