/// Log-mel spectrogram: `n_mel` filter banks, frame-major layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MelSpectrogram {
    pub data: Vec<f32>,
    pub n_mel: usize,
}

impl MelSpectrogram {
    pub fn n_frames(&self) -> usize {
        if self.n_mel == 0 {
            0
        } else {
            self.data.len() / self.n_mel
        }
    }
}
