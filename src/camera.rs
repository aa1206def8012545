//! Frame retrieval from the robot's camera endpoint.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("frame request timed out")]
    Timeout,
    #[error("frame transport failed: {0}")]
    Transport(reqwest::Error),
    #[error("frame endpoint returned status {0}")]
    BadStatus(u16),
}

/// Source of raw camera frames.
///
/// One request per call, no internal retry; the retry policy lives in the
/// control loop.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn fetch_frame(&self) -> Result<Vec<u8>, FetchError>;
}

/// Frame source backed by the device's `/jpg` endpoint.
pub struct HttpFrameSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFrameSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/jpg", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn fetch_frame(&self) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e)
            }
        })?;
        Ok(bytes.to_vec())
    }
}
