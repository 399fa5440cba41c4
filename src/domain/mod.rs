mod audio_sample;
mod language;
mod mel;
mod transcription;

pub use audio_sample::{AudioSample, SAMPLE_RATE};
pub use language::{best_language, language_name, LanguageScore, LANGUAGES};
pub use mel::MelSpectrogram;
pub use transcription::{Segment, Task, TranscriptionOptions, TranscriptionResult};
