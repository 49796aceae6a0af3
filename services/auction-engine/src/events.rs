//! Engine events
//!
//! Round and auction lifecycle notifications, delivered through a typed
//! sink instead of host callbacks. The broadcast sink feeds the
//! gateway's SSE stream; the recording sink serves tests.

use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::broadcast;
use types::bid::Winner;
use types::ids::AuctionId;

/// Lifecycle notification emitted by an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuctionEvent {
    #[serde(rename_all = "camelCase")]
    RoundEnded {
        auction_id: AuctionId,
        round: u32,
        winners: Vec<Winner>,
    },
    #[serde(rename_all = "camelCase")]
    AuctionEnded { auction_id: AuctionId },
}

impl AuctionEvent {
    pub fn auction_id(&self) -> AuctionId {
        match self {
            AuctionEvent::RoundEnded { auction_id, .. } => *auction_id,
            AuctionEvent::AuctionEnded { auction_id } => *auction_id,
        }
    }

    /// Stable event name for stream consumers.
    pub fn name(&self) -> &'static str {
        match self {
            AuctionEvent::RoundEnded { .. } => "roundEnded",
            AuctionEvent::AuctionEnded { .. } => "auctionEnded",
        }
    }
}

/// Host hook receiving engine events.
///
/// Publishing must not block: the engine calls this while holding its
/// state lock.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: AuctionEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: AuctionEvent) {}
}

/// Fan-out sink over a tokio broadcast channel.
pub struct BroadcastSink {
    tx: broadcast::Sender<AuctionEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn sender(&self) -> broadcast::Sender<AuctionEvent> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: AuctionEvent) {
        // A send with no live receivers is fine; events are advisory.
        let _ = self.tx.send(event);
    }
}

/// Sink that stores every event, in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AuctionEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuctionEvent> {
        self.events.lock().expect("recording sink poisoned").clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: AuctionEvent) {
        self.events.lock().expect("recording sink poisoned").push(event);
    }
}
