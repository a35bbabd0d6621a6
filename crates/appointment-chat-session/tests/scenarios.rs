//! End-to-end conversation scenarios against scripted agents.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use appointment_chat_core::{
    AgentGateway, AgentReply, AppointmentId, GatewayError, Role, SessionId,
};
use appointment_chat_session::{
    CLEARED_MESSAGE, ERROR_MESSAGE, ExchangeController, RejectReason, SubmitOutcome,
};
use async_trait::async_trait;
use tokio::sync::oneshot;

/// Records every call and answers with a fixed reply.
struct RecordingGateway {
    reply: Result<AgentReply, String>,
    messages: Mutex<Vec<(String, SessionId)>>,
    resets: AtomicUsize,
}

impl RecordingGateway {
    fn ok(reply: AgentReply) -> Self {
        Self {
            reply: Ok(reply),
            messages: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
        }
    }

    fn unreachable() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
            messages: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
        }
    }

    fn sent(&self) -> Vec<(String, SessionId)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentGateway for RecordingGateway {
    async fn send(&self, message: &str, session_id: &SessionId) -> Result<AgentReply, GatewayError> {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), *session_id));
        self.reply.clone().map_err(GatewayError::Transport)
    }

    async fn reset(&self, _session_id: &SessionId) -> Result<(), GatewayError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.reply
            .as_ref()
            .map(|_| ())
            .map_err(|e| GatewayError::Transport(e.clone()))
    }
}

/// Each send waits for the test to hand it a reply.
struct HandOffGateway {
    pending: Mutex<Vec<oneshot::Sender<AgentReply>>>,
    sends: AtomicUsize,
}

#[async_trait]
impl AgentGateway for HandOffGateway {
    async fn send(&self, _message: &str, _session_id: &SessionId) -> Result<AgentReply, GatewayError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(tx);
        rx.await
            .map_err(|_| GatewayError::Transport("hand-off dropped".into()))
    }

    async fn reset(&self, _session_id: &SessionId) -> Result<(), GatewayError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_booking_confirmation_carries_appointment_id() {
    let controller = ExchangeController::new(RecordingGateway::ok(AgentReply::booked("Booked.", 42_i64)));
    let before = controller.snapshot().len();

    controller.submit("Book appointment with Dr. Sharma on Friday").await;

    let entries = controller.snapshot();
    assert_eq!(entries.len(), before + 2);
    assert_eq!(entries[before].role, Role::User);
    assert_eq!(entries[before].content, "Book appointment with Dr. Sharma on Friday");
    assert_eq!(entries[before + 1].role, Role::Assistant);
    assert_eq!(entries[before + 1].content, "Booked.");
    assert_eq!(entries[before + 1].appointment_id, Some(AppointmentId::from(42_i64)));
    assert!(!entries[before + 1].is_error);

    let sent = controller.gateway().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, *controller.session_id());
}

#[tokio::test]
async fn test_string_appointment_id_round_trips_unchanged() {
    let controller =
        ExchangeController::new(RecordingGateway::ok(AgentReply::booked("Done", "APT-0042")));
    controller.submit("book it").await;

    let last = controller.snapshot().pop().unwrap();
    assert_eq!(last.appointment_id, Some(AppointmentId::Text("APT-0042".into())));
}

#[tokio::test]
async fn test_unreachable_agent_yields_error_entry() {
    let controller = ExchangeController::new(RecordingGateway::unreachable());

    let outcome = controller.submit("hello").await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));

    let entries = controller.snapshot();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].content, "hello");
    assert_eq!(entries[2].role, Role::Assistant);
    assert!(entries[2].is_error);
    assert_eq!(entries[2].content, ERROR_MESSAGE);
    assert!(entries[2].appointment_id.is_none());
    assert!(!controller.is_awaiting());

    // A manual retry goes through again.
    controller.submit("hello").await;
    assert_eq!(controller.snapshot().len(), 5);
    assert_eq!(controller.gateway().sent().len(), 2);
}

#[tokio::test]
async fn test_empty_input_is_ignored() {
    let controller = ExchangeController::new(RecordingGateway::ok(AgentReply::text("unused")));

    for input in ["", "   ", "\n\n"] {
        let outcome = controller.submit(input).await;
        assert_eq!(outcome, SubmitOutcome::Rejected(RejectReason::EmptyInput));
    }

    assert_eq!(controller.snapshot().len(), 1);
    assert!(controller.gateway().sent().is_empty());
}

#[tokio::test]
async fn test_overlapping_submission_is_dropped() {
    let controller = Arc::new(ExchangeController::new(HandOffGateway {
        pending: Mutex::new(Vec::new()),
        sends: AtomicUsize::new(0),
    }));

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("x").await }
    });
    while controller.gateway().sends.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let second = controller.submit("y").await;
    assert_eq!(second, SubmitOutcome::Rejected(RejectReason::ExchangeInFlight));

    let tx = controller.gateway().pending.lock().unwrap().pop().unwrap();
    tx.send(AgentReply::text("reply to x")).unwrap();
    let first = first.await.unwrap();
    assert!(matches!(first, SubmitOutcome::Completed(_)));

    let contents: Vec<String> = controller.snapshot().into_iter().map(|e| e.content).collect();
    assert_eq!(contents[1..], ["x".to_string(), "reply to x".to_string()]);
    assert_eq!(controller.gateway().sends.load(Ordering::SeqCst), 1);
    assert!(!controller.is_awaiting());
}

#[tokio::test]
async fn test_clear_always_leaves_single_seed() {
    for gateway in [
        RecordingGateway::ok(AgentReply::text("ok")),
        RecordingGateway::unreachable(),
    ] {
        let controller = ExchangeController::new(gateway);
        for i in 0..3 {
            controller.submit(&format!("turn {i}")).await;
        }

        controller.clear().await;

        let entries = controller.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, Role::Assistant);
        assert_eq!(entries[0].content, CLEARED_MESSAGE);
        assert_eq!(controller.gateway().resets.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn test_session_token_survives_clear() {
    let controller = ExchangeController::new(RecordingGateway::ok(AgentReply::text("ok")));
    controller.submit("before").await;
    controller.clear().await;
    controller.submit("after").await;

    let sent = controller.gateway().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, sent[1].1);
}
