//! Wire protocol for the agent's chat endpoint.

use appointment_chat_core::{AgentReply, AppointmentId, SessionId};
use serde::{Deserialize, Serialize};

/// Body of `POST {base}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User text, already trimmed.
    pub message: String,
    /// Session token as a plain string.
    pub session_id: String,
}

impl ChatRequest {
    /// Build a request for a session.
    #[must_use]
    pub fn new(message: &str, session_id: &SessionId) -> Self {
        Self {
            message: message.to_string(),
            session_id: session_id.to_string(),
        }
    }
}

/// Body returned by `POST {base}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant text.
    pub response: String,
    /// Echo of the request's session; not relied upon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Set when the turn booked an appointment. `null` is treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
}

impl From<ChatResponse> for AgentReply {
    fn from(resp: ChatResponse) -> Self {
        Self {
            response_text: resp.response,
            appointment_id: resp.appointment_id,
        }
    }
}
