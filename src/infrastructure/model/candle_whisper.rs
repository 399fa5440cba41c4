use std::path::Path;
use std::sync::Arc;

use candle_core::{Device, IndexOp, Tensor};
use candle_nn::ops::softmax;
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{MelExtractor, ModelError, SpeechModel};
use crate::domain::{
    best_language, AudioSample, LanguageScore, MelSpectrogram, Segment, Task,
    TranscriptionOptions, TranscriptionResult, LANGUAGES,
};

const MAX_DECODE_TOKENS: usize = 224;

/// Candle-backed Whisper model. All inference state (kv caches) lives here,
/// which is why instances sit behind the gateway mutex.
pub struct CandleWhisper {
    model: m::model::Whisper,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Arc<Vec<f32>>,
    /// Language special tokens present in the vocabulary; empty for
    /// English-only model variants.
    lang_tokens: Vec<(String, u32)>,
    model_name: String,
}

impl CandleWhisper {
    /// Loads the model variant named by `model_name` (e.g. "base",
    /// "small.en"). Files are resolved from `models_dir` and fetched from
    /// the hub into it when missing.
    pub fn load(model_name: &str, models_dir: &Path) -> Result<Self, ModelError> {
        let device = Device::cuda_if_available(0)
            .map_err(|e| ModelError::ModelLoadFailed(format!("device: {}", e)))?;
        if device.is_cuda() {
            tracing::info!("Running on GPU");
        } else {
            tracing::info!("Running on CPU");
        }

        let repo_id = format!("openai/whisper-{}", model_name);
        tracing::info!(model = %repo_id, dir = %models_dir.display(), "Loading Whisper model");

        let api = ApiBuilder::new()
            .with_cache_dir(models_dir.to_path_buf())
            .build()
            .map_err(|e| ModelError::ModelLoadFailed(format!("hub api: {}", e)))?;
        let repo = api.repo(Repo::new(repo_id, RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| ModelError::ModelLoadFailed(format!("config.json: {}", e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| ModelError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| ModelError::ModelLoadFailed(format!("model.safetensors: {}", e)))?;

        let mel_repo = api.repo(Repo::new(
            "FL33TW00D-HF/whisper-base".to_string(),
            RepoType::Model,
        ));
        let mel_bytes_path = mel_repo
            .get("melfilters.bytes")
            .map_err(|e| ModelError::ModelLoadFailed(format!("melfilters.bytes: {}", e)))?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| ModelError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| ModelError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        let mel_bytes = std::fs::read(&mel_bytes_path)
            .map_err(|e| ModelError::ModelLoadFailed(format!("mel filters: {}", e)))?;
        let mel_filters = Arc::new(read_mel_filters(&mel_bytes, &config)?);

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| ModelError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| ModelError::ModelLoadFailed(format!("model: {}", e)))?;

        let lang_tokens: Vec<(String, u32)> = LANGUAGES
            .iter()
            .filter_map(|(code, _)| {
                tokenizer
                    .token_to_id(&format!("<|{}|>", code))
                    .map(|id| (code.to_string(), id))
            })
            .collect();

        tracing::info!(
            languages = lang_tokens.len(),
            multilingual = !lang_tokens.is_empty(),
            "Whisper model loaded"
        );

        Ok(Self {
            model,
            tokenizer,
            config,
            device,
            mel_filters,
            lang_tokens,
            model_name: model_name.to_string(),
        })
    }

    fn multilingual(&self) -> bool {
        !self.lang_tokens.is_empty()
    }

    fn token_id(&self, token: &str) -> Result<u32, ModelError> {
        self.tokenizer
            .token_to_id(token)
            .ok_or_else(|| ModelError::InferenceFailed(format!("token not found: {}", token)))
    }

    fn lang_token(&self, code: &str) -> Result<u32, ModelError> {
        self.lang_tokens
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, id)| *id)
            .ok_or_else(|| ModelError::UnknownLanguage(code.to_string()))
    }

    /// Mel spectrogram for up to one 30-second chunk, zero-padded to the
    /// full window.
    fn chunk_mel(&self, chunk: &[f32]) -> Result<Tensor, ModelError> {
        let mut samples = chunk.to_vec();
        samples.resize(m::N_SAMPLES, 0.0);

        let mel_data = m::audio::pcm_to_mel(&self.config, &samples, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let n_frames = mel_data.len() / n_mel;

        Tensor::from_vec(mel_data, (1, n_mel, n_frames), &self.device)
            .map_err(|e| ModelError::InferenceFailed(format!("mel tensor: {}", e)))
    }

    /// One decoder step from SOT, probabilities read off the language
    /// special tokens.
    fn language_scores(&mut self, mel: &Tensor) -> Result<Vec<LanguageScore>, ModelError> {
        if !self.multilingual() {
            return Err(ModelError::DetectionUnsupported(format!(
                "model {} is English-only",
                self.model_name
            )));
        }

        let sot_token = self.token_id(m::SOT_TOKEN)?;

        let audio_features = self
            .model
            .encoder
            .forward(mel, true)
            .map_err(|e| ModelError::InferenceFailed(format!("encoder: {}", e)))?;

        let tokens = Tensor::new(&[[sot_token]], &self.device)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;
        let ys = self
            .model
            .decoder
            .forward(&tokens, &audio_features, true)
            .map_err(|e| ModelError::InferenceFailed(format!("decoder: {}", e)))?;

        let logits = self
            .model
            .decoder
            .final_linear(&ys.i(..1).map_err(|e| ModelError::InferenceFailed(e.to_string()))?)
            .map_err(|e| ModelError::InferenceFailed(format!("linear: {}", e)))?
            .i(0)
            .and_then(|t| t.i(0))
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        let ids: Vec<u32> = self.lang_tokens.iter().map(|(_, id)| *id).collect();
        let ids = Tensor::new(ids.as_slice(), &self.device)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;
        let lang_logits = logits
            .index_select(&ids, 0)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;
        let probs = softmax(&lang_logits, 0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| ModelError::InferenceFailed(format!("softmax: {}", e)))?;

        self.model.reset_kv_cache();

        Ok(self
            .lang_tokens
            .iter()
            .zip(probs)
            .map(|((code, _), probability)| LanguageScore {
                code: code.clone(),
                probability,
            })
            .collect())
    }

    /// Special-token prefix selecting language and task. English-only
    /// variants carry neither language nor task tokens.
    fn decoder_prefix(&self, task: Task, language: Option<&str>) -> Result<Vec<u32>, ModelError> {
        let mut tokens = vec![self.token_id(m::SOT_TOKEN)?];
        if self.multilingual() {
            if let Some(code) = language {
                tokens.push(self.lang_token(code)?);
            }
            tokens.push(match task {
                Task::Transcribe => self.token_id(m::TRANSCRIBE_TOKEN)?,
                Task::Translate => self.token_id(m::TRANSLATE_TOKEN)?,
            });
        }
        tokens.push(self.token_id(m::NO_TIMESTAMPS_TOKEN)?);
        Ok(tokens)
    }

    /// Greedy decode of one 30-second chunk.
    fn decode_chunk(&mut self, mel: &Tensor, prefix: &[u32]) -> Result<String, ModelError> {
        let eot_token = self.token_id(m::EOT_TOKEN)?;

        let audio_features = self
            .model
            .encoder
            .forward(mel, true)
            .map_err(|e| ModelError::InferenceFailed(format!("encoder: {}", e)))?;

        let mut tokens = prefix.to_vec();
        let mut decoded_text = String::new();

        for _ in 0..MAX_DECODE_TOKENS {
            let token_tensor = Tensor::new(tokens.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

            let flush_cache = tokens.len() == prefix.len();
            let decoder_output = self
                .model
                .decoder
                .forward(&token_tensor, &audio_features, flush_cache)
                .map_err(|e| ModelError::InferenceFailed(format!("decoder: {}", e)))?;

            let logits = self
                .model
                .decoder
                .final_linear(
                    &decoder_output
                        .squeeze(0)
                        .map_err(|e| ModelError::InferenceFailed(e.to_string()))?,
                )
                .map_err(|e| ModelError::InferenceFailed(format!("linear: {}", e)))?;

            let seq_len = logits
                .dim(0)
                .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;
            let next_token = logits
                .get(seq_len - 1)
                .and_then(|t| t.argmax(0))
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

            if next_token == eot_token {
                break;
            }

            tokens.push(next_token);

            if let Some(text) = self.tokenizer.id_to_token(next_token) {
                let text = text.replace("Ġ", " ").replace("▁", " ");
                decoded_text.push_str(&text);
            }
        }

        self.model.reset_kv_cache();

        Ok(decoded_text.trim().to_string())
    }
}

/// Lock-free mel front end. Holds only the filter bank and audio config, so
/// spectrograms can be computed while the model itself is busy.
pub struct CandleMelExtractor {
    config: Config,
    mel_filters: Arc<Vec<f32>>,
}

impl MelExtractor for CandleMelExtractor {
    fn log_mel(&self, audio: &AudioSample) -> Result<MelSpectrogram, ModelError> {
        let data = m::audio::pcm_to_mel(&self.config, audio.samples(), &self.mel_filters);
        Ok(MelSpectrogram {
            data,
            n_mel: self.config.num_mel_bins,
        })
    }
}

impl SpeechModel for CandleWhisper {
    fn transcribe(
        &mut self,
        audio: &AudioSample,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, ModelError> {
        if options.task == Task::Translate && !self.multilingual() {
            return Err(ModelError::InferenceFailed(format!(
                "translation requires a multilingual model, {} is English-only",
                self.model_name
            )));
        }

        let mut language = options.language.clone();
        if let (Some(code), true) = (language.as_deref(), self.multilingual()) {
            // Reject unknown codes before touching the audio.
            self.lang_token(code)?;
        }

        let duration = audio.duration_secs();
        let chunk_secs = m::CHUNK_LENGTH as f64;
        let mut segments: Vec<Segment> = Vec::new();

        for (i, chunk) in audio.samples().chunks(m::N_SAMPLES).enumerate() {
            let mel = self.chunk_mel(chunk)?;

            if i == 0 && language.is_none() && self.multilingual() {
                let scores = self.language_scores(&mel)?;
                language = best_language(&scores).map(|s| s.code.clone());
                if let Some(code) = &language {
                    tracing::debug!(language = %code, "Auto-detected language");
                }
            }

            let prefix = self.decoder_prefix(options.task, language.as_deref())?;

            tracing::debug!(segment = i, "Transcribing audio segment");
            let text = self.decode_chunk(&mel, &prefix)?;

            if !text.is_empty() {
                let start = i as f64 * chunk_secs;
                segments.push(Segment {
                    id: segments.len(),
                    start,
                    end: (start + chunk_secs).min(duration),
                    text,
                });
            }
        }

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::info!(
            segments = segments.len(),
            chars = text.len(),
            "Audio transcription completed"
        );

        Ok(TranscriptionResult {
            text,
            segments,
            language,
        })
    }

    fn mel_extractor(&self) -> Arc<dyn MelExtractor> {
        Arc::new(CandleMelExtractor {
            config: self.config.clone(),
            mel_filters: Arc::clone(&self.mel_filters),
        })
    }

    fn detect_language(&mut self, mel: &MelSpectrogram) -> Result<Vec<LanguageScore>, ModelError> {
        let n_frames = mel.n_frames();
        let mel = Tensor::from_vec(mel.data.clone(), (1, mel.n_mel, n_frames), &self.device)
            .map_err(|e| ModelError::InferenceFailed(format!("mel tensor: {}", e)))?;
        self.language_scores(&mel)
    }
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, ModelError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(ModelError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    let filters: Vec<f32> = bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(filters)
}
