//! Terminal view for the appointment scheduling chat.
//!
//! Provides:
//! - Key mapping from crossterm events to chat actions
//! - ratatui rendering of a controller `ViewState`
//! - Static quick-start content

pub mod input;
pub mod prompts;
pub mod view;

pub use input::ChatAction;
pub use view::{MessageScroll, draw};
