//! Exchange controller orchestrating one request/response cycle per submission.

use std::sync::{Mutex, MutexGuard, PoisonError};

use appointment_chat_core::{
    AgentGateway, MessageEntry, SessionId, Transcript, TranscriptEvent,
};
use tokio::sync::broadcast;

/// Seed entry shown when a conversation view opens.
pub const WELCOME_MESSAGE: &str = "Hello! 👋 I'm your medical appointment scheduling assistant. \
I can help you:\n\n• Check doctor availability\n• Book appointments\n• Find the right specialist\n\n\
How can I help you today?";

/// Seed entry left behind by `clear`.
pub const CLEARED_MESSAGE: &str = "Chat cleared! How can I help you with your appointment today?";

/// Fixed text of the entry synthesized when an exchange fails.
pub const ERROR_MESSAGE: &str = "❌ Sorry, I encountered an error. \
Please make sure the appointment agent server is running and reachable.";

/// Prompt sent by the summary report shortcut.
pub const REPORT_PROMPT: &str = "Generate a full summary report";

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Input is empty")]
    EmptyInput,
    #[error("An exchange is already in flight")]
    ExchangeInFlight,
    #[error("Suggested prompts are no longer offered")]
    SuggestionsUnavailable,
    #[error("The conversation is being cleared")]
    ClearInProgress,
}

/// Result of one `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The agent replied; the entry was appended.
    Completed(MessageEntry),
    /// The request failed; an error entry was appended.
    Failed(MessageEntry),
    /// The transcript was cleared while the request was in flight, so the
    /// reply was dropped.
    Discarded,
    /// Nothing was appended and no request was issued.
    Rejected(RejectReason),
}

impl SubmitOutcome {
    /// Whether a user entry was appended and a request issued.
    #[must_use]
    pub const fn was_sent(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Consistent copy of everything a view needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub session_id: SessionId,
    pub entries: Vec<MessageEntry>,
    pub awaiting: bool,
    pub pending_input: String,
    pub suggestions_available: bool,
}

/// Mutable conversation state. Only touched under the controller's lock,
/// and the lock is never held across an await.
struct ExchangeState {
    transcript: Transcript,
    awaiting: bool,
    pending_input: String,
    /// Bumped by `clear` so replies to earlier turns can be recognized.
    generation: u64,
    /// `clear` calls still waiting on the backend.
    clears_pending: usize,
}

impl ExchangeState {
    fn suggestions_available(&self) -> bool {
        self.transcript.len() <= 1 && !self.awaiting && self.clears_pending == 0
    }
}

/// Resets `awaiting` when an exchange ends.
///
/// If the submitting future is dropped before the gateway answers, the
/// user entry is closed with an error entry so the turn is never left open.
struct InFlight<'a> {
    state: &'a Mutex<ExchangeState>,
    generation: u64,
    answered: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.answered && state.generation == self.generation {
            tracing::debug!("exchange cancelled before the agent answered");
            state.transcript.append(MessageEntry::error(ERROR_MESSAGE));
        }
        state.awaiting = false;
    }
}

/// Marks a backend reset as outstanding for as long as it lives.
struct Clearing<'a> {
    state: &'a Mutex<ExchangeState>,
}

impl Drop for Clearing<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.clears_pending = state.clears_pending.saturating_sub(1);
    }
}

/// Owns the session token, transcript, and single-flight guard.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct ExchangeController<G>
where
    G: AgentGateway,
{
    gateway: G,
    session_id: SessionId,
    state: Mutex<ExchangeState>,
}

impl<G> ExchangeController<G>
where
    G: AgentGateway,
{
    /// Create a controller with a fresh session token and the welcome seed.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self::with_session(gateway, SessionId::new())
    }

    /// Create a controller for a known session token.
    #[must_use]
    pub fn with_session(gateway: G, session_id: SessionId) -> Self {
        tracing::debug!(%session_id, "conversation created");
        Self {
            gateway,
            session_id,
            state: Mutex::new(ExchangeState {
                transcript: Transcript::new(MessageEntry::assistant(WELCOME_MESSAGE, None)),
                awaiting: false,
                pending_input: String::new(),
                generation: 0,
                clears_pending: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ExchangeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Session token sent with every request.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The gateway this controller talks to.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Ordered copy of the transcript.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageEntry> {
        self.lock().transcript.snapshot()
    }

    /// Whether an exchange is in flight.
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.lock().awaiting
    }

    /// Suggested prompts are offered only before the first exchange.
    #[must_use]
    pub fn suggestions_available(&self) -> bool {
        self.lock().suggestions_available()
    }

    /// Everything a view needs, read under one lock.
    #[must_use]
    pub fn view(&self) -> ViewState {
        let state = self.lock();
        ViewState {
            session_id: self.session_id,
            entries: state.transcript.snapshot(),
            awaiting: state.awaiting,
            pending_input: state.pending_input.clone(),
            suggestions_available: state.suggestions_available(),
        }
    }

    /// Get a receiver for transcript changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.lock().transcript.subscribe()
    }

    /// Current transcript followed by live changes.
    #[must_use]
    pub fn stream(&self) -> futures::stream::BoxStream<'static, TranscriptEvent> {
        self.lock().transcript.snapshot_plus_stream()
    }

    /// Contents of the free-text input buffer.
    #[must_use]
    pub fn pending_input(&self) -> String {
        self.lock().pending_input.clone()
    }

    /// Replace the input buffer.
    pub fn set_pending_input(&self, text: impl Into<String>) {
        self.lock().pending_input = text.into();
    }

    /// Type one character. Ignored while an exchange is in flight.
    ///
    /// Returns true if the buffer changed.
    pub fn push_input(&self, c: char) -> bool {
        let mut state = self.lock();
        if state.awaiting {
            return false;
        }
        state.pending_input.push(c);
        true
    }

    /// Delete the last character. Ignored while an exchange is in flight.
    pub fn pop_input(&self) -> Option<char> {
        let mut state = self.lock();
        if state.awaiting {
            return None;
        }
        state.pending_input.pop()
    }

    /// Submit the contents of the input buffer.
    pub async fn submit_pending(&self) -> SubmitOutcome {
        let text = self.pending_input();
        self.submit(&text).await
    }

    /// Submit a predefined quick-start prompt.
    ///
    /// Only honoured while `suggestions_available` holds.
    pub async fn submit_suggested(&self, prompt: &str) -> SubmitOutcome {
        self.run_exchange(prompt, true).await
    }

    /// Ask the agent for a summary report.
    pub async fn request_report(&self) -> SubmitOutcome {
        self.submit(REPORT_PROMPT).await
    }

    /// Run one exchange for `text`.
    ///
    /// Empty input, or input arriving while another exchange is in flight,
    /// is dropped without touching the transcript. Otherwise the user entry
    /// is appended before the request starts and exactly one assistant entry
    /// (reply or error) follows it. Failures never escape.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        self.run_exchange(text, false).await
    }

    #[tracing::instrument(skip(self, text), fields(session_id = %self.session_id))]
    async fn run_exchange(&self, text: &str, suggested: bool) -> SubmitOutcome {
        let text = text.trim();

        let generation = match self.begin(text, suggested) {
            Ok(generation) => generation,
            Err(reason) => {
                tracing::debug!(%reason, "submission ignored");
                return SubmitOutcome::Rejected(reason);
            }
        };
        let mut in_flight = InFlight {
            state: &self.state,
            generation,
            answered: false,
        };

        let result = self.gateway.send(text, &self.session_id).await;
        in_flight.answered = true;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!("transcript cleared during exchange; dropping reply");
            return SubmitOutcome::Discarded;
        }

        let outcome = match result {
            Ok(reply) => {
                let entry = MessageEntry::assistant(reply.response_text, reply.appointment_id);
                SubmitOutcome::Completed(entry)
            }
            Err(e) => {
                tracing::warn!(error = %e, "agent request failed");
                SubmitOutcome::Failed(MessageEntry::error(ERROR_MESSAGE))
            }
        };
        if let SubmitOutcome::Completed(entry) | SubmitOutcome::Failed(entry) = &outcome {
            state.transcript.append(entry.clone());
        }
        drop(state);

        outcome
    }

    /// Check-and-set of the single-flight guard plus the optimistic user
    /// entry, all under one lock.
    fn begin(&self, text: &str, suggested: bool) -> Result<u64, RejectReason> {
        let mut state = self.lock();
        if suggested && !state.suggestions_available() {
            return Err(RejectReason::SuggestionsUnavailable);
        }
        if text.is_empty() {
            return Err(RejectReason::EmptyInput);
        }
        if state.awaiting {
            return Err(RejectReason::ExchangeInFlight);
        }
        if state.clears_pending > 0 {
            return Err(RejectReason::ClearInProgress);
        }

        state.transcript.append(MessageEntry::user(text));
        state.pending_input.clear();
        state.awaiting = true;
        Ok(state.generation)
    }

    /// Reset the transcript to the "chat cleared" seed, then ask the backend
    /// to forget the session.
    ///
    /// The local reset always happens; backend failures are only logged.
    /// Any reply still in flight is dropped when it arrives, and new
    /// submissions are rejected until the backend has answered.
    #[tracing::instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn clear(&self) {
        {
            let mut state = self.lock();
            state.generation = state.generation.wrapping_add(1);
            state.clears_pending += 1;
            state
                .transcript
                .reset(MessageEntry::assistant(CLEARED_MESSAGE, None));
        }
        let _clearing = Clearing { state: &self.state };

        if let Err(e) = self.gateway.reset(&self.session_id).await {
            tracing::warn!(error = %e, "backend session reset failed; cleared locally");
        }
    }
}
