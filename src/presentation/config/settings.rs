use std::path::PathBuf;

use crate::infrastructure::audio::DecoderBackend;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub decoder: DecoderBackend,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Whisper size/variant, e.g. "tiny", "base", "small.en".
    pub name: String,
    /// Directory the model weights live in (and are downloaded into).
    pub models_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| SettingsError::Invalid("SERVER_PORT", raw))?,
            Err(_) => 3000,
        };

        let name = std::env::var("ASR_MODEL").unwrap_or_else(|_| "base".to_string());
        let models_dir = std::env::var("ASR_MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/whisper_models"));

        let decoder = match std::env::var("AUDIO_DECODER") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| SettingsError::Invalid("AUDIO_DECODER", raw))?,
            Err(_) => DecoderBackend::Ffmpeg,
        };

        Ok(Self {
            server: ServerSettings { port },
            model: ModelSettings { name, models_dir },
            decoder,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Tests share the process environment, so every mutation runs under one
    // lock and restores the prior values before releasing it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = ["SERVER_PORT", "ASR_MODEL", "ASR_MODELS_DIR", "AUDIO_DECODER"];

    fn with_env(overrides: &[(&str, &str)], check: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<(&str, Option<String>)> = VARS
            .iter()
            .map(|name| (*name, std::env::var(name).ok()))
            .collect();
        for name in VARS {
            std::env::remove_var(name);
        }
        for (name, value) in overrides {
            std::env::set_var(name, value);
        }

        check();

        for (name, value) in saved {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        with_env(&[], || {
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings.server.port, 3000);
            assert_eq!(settings.model.name, "base");
            assert_eq!(settings.model.models_dir, PathBuf::from("/whisper_models"));
            assert_eq!(settings.decoder, DecoderBackend::Ffmpeg);
        });
    }

    #[test]
    fn environment_overrides_are_honored() {
        with_env(
            &[
                ("SERVER_PORT", "8080"),
                ("ASR_MODEL", "small.en"),
                ("ASR_MODELS_DIR", "/srv/models"),
                ("AUDIO_DECODER", "symphonia"),
            ],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(settings.server.port, 8080);
                assert_eq!(settings.model.name, "small.en");
                assert_eq!(settings.model.models_dir, PathBuf::from("/srv/models"));
                assert_eq!(settings.decoder, DecoderBackend::Symphonia);
            },
        );
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        with_env(&[("SERVER_PORT", "not-a-port")], || {
            let err = Settings::from_env().unwrap_err();
            assert!(matches!(err, SettingsError::Invalid("SERVER_PORT", _)));
        });
    }

    #[test]
    fn unknown_decoder_backend_is_rejected() {
        with_env(&[("AUDIO_DECODER", "sox")], || {
            let err = Settings::from_env().unwrap_err();
            assert!(matches!(err, SettingsError::Invalid("AUDIO_DECODER", _)));
        });
    }
}
