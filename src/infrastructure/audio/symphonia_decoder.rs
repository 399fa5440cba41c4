use std::io::Cursor;

use async_trait::async_trait;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioDecoder, DecodeError};
use crate::domain::{AudioSample, SAMPLE_RATE};

/// In-process fallback decoder for deployments without an ffmpeg binary.
/// Probes the container format, decodes, downmixes to mono and resamples to
/// 16 kHz.
pub struct SymphoniaDecoder;

#[async_trait]
impl AudioDecoder for SymphoniaDecoder {
    async fn decode(&self, data: &[u8]) -> Result<AudioSample, DecodeError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let hint = Hint::new();
        let format_opts = FormatOptions::default();
        let metadata_opts = MetadataOptions::default();
        let decoder_opts = DecoderOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| DecodeError::Failed(format!("probe: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| DecodeError::Failed("no audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let source_rate = codec_params
            .sample_rate
            .ok_or_else(|| DecodeError::Failed("unknown sample rate".to_string()))?;
        let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &decoder_opts)
            .map_err(|e| DecodeError::Failed(format!("codec: {}", e)))?;

        let mut pcm: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(DecodeError::Failed(format!("packet: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(symphonia::core::errors::Error::DecodeError(e)) => {
                    tracing::warn!(error = %e, "Skipping corrupt audio frame");
                    continue;
                }
                Err(e) => {
                    return Err(DecodeError::Failed(format!("decode: {}", e)));
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            if num_frames == 0 {
                continue;
            }

            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let samples = sample_buf.samples();

            if channels > 1 {
                for frame in samples.chunks(channels) {
                    let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                    pcm.push(mono);
                }
            } else {
                pcm.extend_from_slice(samples);
            }
        }

        if pcm.is_empty() {
            return Err(DecodeError::Failed("no audio samples decoded".to_string()));
        }

        if source_rate != SAMPLE_RATE {
            pcm = resample(&pcm, source_rate, SAMPLE_RATE)?;
        }

        let audio = AudioSample::from_samples(pcm);

        tracing::debug!(
            samples = audio.len(),
            duration_secs = audio.duration_secs(),
            source_rate,
            "Audio decoded in-process"
        );

        Ok(audio)
    }
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, DecodeError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| DecodeError::Failed(format!("resampler init: {}", e)))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);

    for chunk in samples.chunks(chunk_size) {
        let input = if chunk.len() < chunk_size {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            padded
        } else {
            chunk.to_vec()
        };

        let result = resampler
            .process(&[input], None)
            .map_err(|e| DecodeError::Failed(format!("resample: {}", e)))?;

        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    // Trim the tail the padded final chunk introduced.
    let expected_len = (samples.len() as f64 * ratio) as usize;
    output.truncate(expected_len);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::audio::test_wav::synthetic_wav;

    #[tokio::test]
    async fn decodes_a_16khz_wav_without_resampling() {
        let wav = synthetic_wav(SAMPLE_RATE, 1.0);
        let audio = SymphoniaDecoder.decode(&wav).await.unwrap();

        assert!((audio.len() as i64 - SAMPLE_RATE as i64).unsigned_abs() <= 1);
        assert!(audio.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn resamples_a_48khz_wav_down_to_16khz() {
        let wav = synthetic_wav(48_000, 0.5);
        let audio = SymphoniaDecoder.decode(&wav).await.unwrap();

        let expected = SAMPLE_RATE as f64 * 0.5;
        let tolerance = SAMPLE_RATE as f64 * 0.01;
        assert!((audio.len() as f64 - expected).abs() <= tolerance);
        assert!(audio.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_with_a_diagnostic() {
        let err = SymphoniaDecoder.decode(&[0u8; 64]).await.unwrap_err();
        assert!(matches!(err, DecodeError::Failed(_)));
    }
}
