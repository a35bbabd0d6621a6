//! HTTP gateway to the appointment scheduling agent.
//!
//! Provides:
//! - Wire protocol for the `/chat` endpoint
//! - `GatewayConfig` - Base URL and optional timeout
//! - `HttpGateway` - `AgentGateway` implementation over reqwest

pub mod config;
pub mod http;
pub mod protocol;

pub use config::{ConfigError, GatewayConfig};
pub use http::HttpGateway;
pub use protocol::{ChatRequest, ChatResponse};
