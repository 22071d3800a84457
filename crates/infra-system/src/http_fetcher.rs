// HTTP image fetcher
// reason: reqwest for async HTTP with a per-request timeout
use async_trait::async_trait;
use std::time::Duration;
use thumbnailer_core::port::{FetchError, ImageFetcher};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("thumbnail-worker/", env!("CARGO_PKG_VERSION"));

fn transport_error(url: &str, err: &reqwest::Error) -> FetchError {
    let mut message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else {
        err.to_string()
    };
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

/// Fetches images over HTTP(S)
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    ///
    /// # Example
    /// ```ignore
    /// let fetcher = HttpImageFetcher::new(Duration::from_secs(30))?;
    /// ```
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            warn!(error = %err, "Fetch returned non-success status");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;

        debug!(url = %url, bytes = bytes.len(), "Fetched image");
        Ok(bytes.to_vec())
    }
}
