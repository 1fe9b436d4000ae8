use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::{pin_mut, Stream, StreamExt};
use tracing::debug;

use crate::config::AcquisitionConfig;
use crate::error::{AssetError, CompositorError, Result};

/// Something that can turn an image reference into raw bytes
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch the full payload behind `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP(S) image source backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpImageSource {
    pub fn new(config: &AcquisitionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CompositorError::generic(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_failed = |reason: String| AssetError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_failed(e.to_string()))?;

        // Refuse oversized payloads before reading the body
        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(fetch_failed(format!(
                    "Content-Length {} exceeds limit of {} bytes",
                    length, self.max_bytes
                ))
                .into());
            }
        }

        // Chunked responses carry no Content-Length, so the limit is also enforced while reading
        let bytes = read_limited(response.bytes_stream(), self.max_bytes)
            .await
            .map_err(fetch_failed)?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

/// Collect a body stream, giving up as soon as it grows past `max_bytes`
async fn read_limited<S, B, E>(body: S, max_bytes: u64) -> std::result::Result<Vec<u8>, String>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let mut buffer = Vec::new();
    let mut total_bytes: u64 = 0;

    pin_mut!(body);
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        let chunk = chunk.as_ref();

        total_bytes += chunk.len() as u64;
        if total_bytes > max_bytes {
            return Err(format!(
                "body exceeds limit of {} bytes after {} bytes read",
                max_bytes, total_bytes
            ));
        }
        buffer.extend_from_slice(chunk);
    }

    Ok(buffer)
}
