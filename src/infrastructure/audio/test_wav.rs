//! Minimal WAV writer for decoder tests: 16-bit PCM, mono, one RIFF chunk.

/// A sine-wave WAV of the given duration at the given rate, amplitude 0.5.
pub fn synthetic_wav(sample_rate: u32, duration_secs: f64) -> Vec<u8> {
    let num_samples = (sample_rate as f64 * duration_secs) as usize;
    let data_len = (num_samples * 2) as u32;
    let byte_rate = sample_rate * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());

    for i in 0..num_samples {
        let t = i as f64 / sample_rate as f64;
        let value = (0.5 * (2.0 * std::f64::consts::PI * 440.0 * t).sin() * 32767.0) as i16;
        wav.extend_from_slice(&value.to_le_bytes());
    }

    wav
}
