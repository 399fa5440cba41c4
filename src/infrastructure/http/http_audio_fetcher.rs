use async_trait::async_trait;

use crate::application::ports::{AudioFetcher, FetchError};

/// Fetches audio over HTTP(S) with a plain GET. Presigned object-store URLs
/// are the expected input, so no auth headers are attached.
pub struct HttpAudioFetcher {
    client: reqwest::Client,
}

impl HttpAudioFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpAudioFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioFetcher for HttpAudioFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url, "Fetching audio");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("{}: {}", url, e)))?;

        tracing::debug!(url, bytes = bytes.len(), "Audio fetched");

        Ok(bytes.to_vec())
    }
}
