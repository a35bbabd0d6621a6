//! Core conversation model for the appointment scheduling chat.
//!
//! This crate provides the fundamental building blocks:
//! - `SessionId` - Opaque token correlating turns at the backend
//! - `MessageEntry` - One immutable utterance in the transcript
//! - `Transcript` - Ordered history + broadcast for live views
//! - `AgentGateway` trait for the remote agent service

pub mod message;
pub mod session;
pub mod traits;
pub mod transcript;

pub use message::{AppointmentId, MessageEntry, MessageId, Role};
pub use session::SessionId;
pub use traits::{AgentGateway, AgentReply, GatewayError};
pub use transcript::{Transcript, TranscriptEvent};
