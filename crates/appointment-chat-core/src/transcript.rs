//! Ordered transcript store with broadcast for live views.

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::MessageEntry;

/// Live listener buffer; slow listeners skip ahead rather than block.
const EVENT_CAPACITY: usize = 1024;

/// Change notification for live listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// One entry was added to the end.
    Appended(MessageEntry),
    /// The whole transcript was replaced by this single seed entry.
    Reset(MessageEntry),
}

impl TranscriptEvent {
    /// Apply this event to a locally mirrored entry list.
    pub fn apply(self, entries: &mut Vec<MessageEntry>) {
        match self {
            Self::Appended(entry) => entries.push(entry),
            Self::Reset(seed) => {
                entries.clear();
                entries.push(seed);
            }
        }
    }
}

/// Append-only (except for explicit reset) message log.
///
/// Always holds at least one entry: it is constructed from a seed and
/// `reset` replaces the contents with another seed.
pub struct Transcript {
    entries: Vec<MessageEntry>,
    sender: broadcast::Sender<TranscriptEvent>,
}

impl Transcript {
    /// Create a transcript holding only `seed`.
    #[must_use]
    pub fn new(seed: MessageEntry) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        let mut entries = Vec::with_capacity(32);
        entries.push(seed);
        Self { entries, sender }
    }

    /// Add one entry to the end.
    pub fn append(&mut self, entry: MessageEntry) {
        tracing::debug!(id = %entry.id, role = ?entry.role, "transcript append");
        let _ = self.sender.send(TranscriptEvent::Appended(entry.clone())); // live listeners
        self.entries.push(entry);
    }

    /// Replace the whole sequence with a single seed entry.
    pub fn reset(&mut self, seed: MessageEntry) {
        tracing::debug!(dropped = self.entries.len(), "transcript reset");
        let _ = self.sender.send(TranscriptEvent::Reset(seed.clone()));
        self.entries.clear();
        self.entries.push(seed);
    }

    /// Ordered copy of all entries.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageEntry> {
        self.entries.clone()
    }

    /// Borrow the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    /// Number of entries; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&MessageEntry> {
        self.entries.last()
    }

    /// Get a receiver for live updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.sender.subscribe()
    }

    /// Stream that replays the current contents, then yields live updates.
    ///
    /// The replay starts with a `Reset` carrying the first entry so a
    /// listener can rebuild the list by applying every event in order.
    #[must_use]
    pub fn snapshot_plus_stream(&self) -> futures::stream::BoxStream<'static, TranscriptEvent> {
        let (history, rx) = (self.snapshot(), self.subscribe());

        let replay = history.into_iter().enumerate().map(|(i, entry)| {
            if i == 0 {
                TranscriptEvent::Reset(entry)
            } else {
                TranscriptEvent::Appended(entry)
            }
        });
        let live = BroadcastStream::new(rx).filter_map(|res| async move { res.ok() });

        futures::stream::iter(replay).chain(live).boxed()
    }
}
