//! Remote agent gateway contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppointmentId, SessionId};

/// Reply to one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    /// Assistant text to show.
    pub response_text: String,
    /// Set when the turn produced a booking.
    pub appointment_id: Option<AppointmentId>,
}

impl AgentReply {
    /// Plain text reply.
    #[must_use]
    pub fn text(response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            appointment_id: None,
        }
    }

    /// Reply confirming a booking.
    #[must_use]
    pub fn booked(response_text: impl Into<String>, appointment_id: impl Into<AppointmentId>) -> Self {
        Self {
            response_text: response_text.into(),
            appointment_id: Some(appointment_id.into()),
        }
    }
}

/// Request failure at the gateway boundary.
///
/// Callers treat every variant the same way; the split exists for logs.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Agent returned HTTP {status}")]
    Status { status: u16 },
    #[error("Malformed agent response: {0}")]
    Decode(String),
}

/// Narrow interface to the backend agent.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Send one user message within a session.
    async fn send(&self, message: &str, session_id: &SessionId) -> Result<AgentReply, GatewayError>;

    /// Ask the backend to drop state held for a session.
    async fn reset(&self, session_id: &SessionId) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: AgentGateway + ?Sized> AgentGateway for Arc<G> {
    async fn send(&self, message: &str, session_id: &SessionId) -> Result<AgentReply, GatewayError> {
        (**self).send(message, session_id).await
    }

    async fn reset(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        (**self).reset(session_id).await
    }
}
