use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::application::ports::{AudioDecoder, DecodeError};
use crate::domain::{AudioSample, SAMPLE_RATE};

/// Production decoder: pipes the bytes through an external `ffmpeg` process
/// that auto-detects the container/codec and emits raw s16le mono PCM at
/// 16 kHz on stdout.
pub struct FfmpegDecoder {
    binary: String,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioDecoder for FfmpegDecoder {
    async fn decode(&self, data: &[u8]) -> Result<AudioSample, DecodeError> {
        let sample_rate = SAMPLE_RATE.to_string();
        let mut child = Command::new(&self.binary)
            .args([
                "-nostdin",
                "-threads",
                "0",
                "-i",
                "pipe:",
                "-f",
                "s16le",
                "-ac",
                "1",
                "-acodec",
                "pcm_s16le",
                "-ar",
                sample_rate.as_str(),
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecodeError::Unavailable(format!("{}: {}", self.binary, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DecodeError::Unavailable("ffmpeg stdin not captured".to_string()))?;

        // Feed stdin from a separate task while draining stdout, otherwise
        // large inputs deadlock on full pipes. Closing stdin signals EOF.
        let input = data.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DecodeError::Failed(format!("waiting for ffmpeg: {}", e)))?;

        check_writer(writer.await, output.status.success())?;

        if !output.status.success() {
            let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DecodeError::Failed(diagnostic));
        }

        let audio = AudioSample::from_pcm_s16le(&output.stdout);
        if audio.is_empty() {
            return Err(DecodeError::Failed(
                "ffmpeg produced no audio samples".to_string(),
            ));
        }

        tracing::debug!(
            samples = audio.len(),
            duration_secs = audio.duration_secs(),
            "Audio decoded via ffmpeg"
        );

        Ok(audio)
    }
}

/// Folds the stdin writer task's outcome into the decode result. A broken
/// pipe usually accompanies a non-zero ffmpeg exit, in which case ffmpeg's
/// own diagnostics are preferred; a writer task that died is always an error.
fn check_writer(
    result: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
    ffmpeg_succeeded: bool,
) -> Result<(), DecodeError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) if ffmpeg_succeeded => {
            Err(DecodeError::Failed(format!("writing to ffmpeg: {}", e)))
        }
        Ok(Err(_)) => Ok(()),
        Err(e) => Err(DecodeError::Failed(format!(
            "ffmpeg stdin writer task: {}",
            e
        ))),
    }
}
