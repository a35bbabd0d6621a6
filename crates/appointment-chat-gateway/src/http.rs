//! reqwest-backed agent gateway.

use appointment_chat_core::{AgentGateway, AgentReply, GatewayError, SessionId};
use async_trait::async_trait;

use crate::{
    config::{ConfigError, GatewayConfig},
    protocol::{ChatRequest, ChatResponse},
};

/// HTTP client for the scheduling agent.
///
/// One best-effort request per call: no retry, no backoff.
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a gateway from validated config.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl AgentGateway for HttpGateway {
    async fn send(&self, message: &str, session_id: &SessionId) -> Result<AgentReply, GatewayError> {
        let url = self.config.endpoint("chat");
        tracing::debug!(%url, %session_id, "sending chat message");

        let resp = self
            .http
            .post(&url)
            .json(&ChatRequest::new(message, session_id))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        Ok(body.into())
    }

    async fn reset(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        let url = self.config.endpoint(&format!("session/{session_id}"));
        tracing::debug!(%url, "resetting agent session");

        // Any HTTP response counts; only transport failure is an error.
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "agent rejected session reset");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(HttpGateway::new(GatewayConfig::new("localhost:8002")).is_err());
    }
}
