/// Sample rate every waveform in the system is normalized to.
pub const SAMPLE_RATE: u32 = 16_000;

/// A mono waveform at 16 kHz, samples normalized to [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    samples: Vec<f32>,
}

impl AudioSample {
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Interpret raw bytes as signed 16-bit little-endian PCM and normalize
    /// into [-1, 1). A trailing odd byte is ignored.
    pub fn from_pcm_s16le(data: &[u8]) -> Self {
        let samples = data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
            .collect();
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }

    /// Normalize to a fixed-length window: zero-pad short clips, truncate
    /// long ones.
    pub fn pad_or_trim(&self, len: usize) -> Self {
        let mut samples = self.samples.clone();
        samples.resize(len, 0.0);
        Self { samples }
    }
}
