use async_trait::async_trait;

/// Retrieves raw audio bytes from a URL. One attempt, no retries; a failure
/// fails the whole batch item.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unexpected status {status} fetching {url}")]
    UnexpectedStatus { url: String, status: u16 },
}
