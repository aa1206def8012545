//! Actuator command dispatch to the robot's HTTP endpoints.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("command transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("command endpoint returned status {0}")]
    BadStatus(u16),
}

/// Fire-and-forget actuator commands.
///
/// Each call is a single outbound request; the outcome is reported but never
/// retried or queued. Sequencing between commands is the caller's contract.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Start (`true`) or stop (`false`) forward motion along the rail.
    async fn set_traversal(&self, active: bool) -> Result<(), DispatchError>;

    /// Drive the height actuator up (`true`) or down (`false`).
    async fn set_lift(&self, raise: bool) -> Result<(), DispatchError>;

    /// Tell the robot the commanded slot's code has been confirmed.
    async fn signal_arrival(&self) -> Result<(), DispatchError>;
}

/// Dispatcher backed by the device's `/arranque`, `/baja` and `/torre`
/// endpoints.
pub struct HttpDispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDispatcher {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(&self, path: &str, state: u8) -> Result<(), DispatchError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("device <- GET /{} state={}", path, state);

        let response = self
            .client
            .get(&url)
            .query(&[("state", state.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::BadStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandDispatcher for HttpDispatcher {
    async fn set_traversal(&self, active: bool) -> Result<(), DispatchError> {
        self.send("arranque", active as u8).await
    }

    async fn set_lift(&self, raise: bool) -> Result<(), DispatchError> {
        self.send("baja", raise as u8).await
    }

    async fn signal_arrival(&self) -> Result<(), DispatchError> {
        self.send("torre", 1).await
    }
}
