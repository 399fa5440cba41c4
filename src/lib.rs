//! Parlance: an HTTP web service fronting a Whisper speech-recognition
//! model. Two endpoints (batch transcription/translation and spoken
//! language detection) fetch audio from URLs, normalize it to 16 kHz mono
//! PCM, and funnel all inference through a single-flight model gateway.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
