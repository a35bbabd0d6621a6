//! Exchange controller for the appointment scheduling chat.
//!
//! Provides:
//! - `ExchangeController` - Single-flight request/response cycle per submission
//! - Seed and diagnostic messages shown in the transcript

pub mod controller;

pub use controller::{
    CLEARED_MESSAGE, ERROR_MESSAGE, ExchangeController, REPORT_PROMPT, RejectReason,
    SubmitOutcome, ViewState, WELCOME_MESSAGE,
};
