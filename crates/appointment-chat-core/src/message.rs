//! Transcript message entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message entry identifier, used only for stable list rendering.
pub type MessageId = Uuid;

/// Conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person typing.
    User,
    /// The remote scheduling agent (or a locally synthesized stand-in).
    Assistant,
}

/// Booking identifier returned by the agent.
///
/// The backend may send either a number (integer or not) or a string; the
/// value is kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppointmentId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AppointmentId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for AppointmentId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One utterance in the transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    /// Unique identifier, never reused.
    pub id: MessageId,
    /// Who said it.
    pub role: Role,
    /// Text content; line breaks are significant.
    pub content: String,
    /// Local creation time (not server time).
    pub timestamp: DateTime<Utc>,
    /// Present only on booking confirmations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
    /// Set only on entries synthesized after a failed exchange.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl MessageEntry {
    fn build(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            appointment_id: None,
            is_error: false,
        }
    }

    /// A user utterance.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Role::User, content.into())
    }

    /// An assistant reply, optionally confirming a booking.
    #[must_use]
    pub fn assistant(content: impl Into<String>, appointment_id: Option<AppointmentId>) -> Self {
        Self {
            appointment_id,
            ..Self::build(Role::Assistant, content.into())
        }
    }

    /// A locally synthesized assistant entry reporting a failed exchange.
    #[must_use]
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::build(Role::Assistant, content.into())
        }
    }

    /// Whether this entry confirms a booking.
    #[must_use]
    pub const fn is_confirmation(&self) -> bool {
        self.appointment_id.is_some()
    }

    /// Content split on line breaks, preserving empty lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}
