//! Status-change event system for SSE broadcasting.
//!
//! [`EventBus`] fans tracker events out over a `tokio::sync::broadcast`
//! channel and keeps a short history for clients that connect late. Every
//! view of a title subscribes to it and re-resolves the title named by a
//! [`EventPayload::StatusInvalidated`] event, so one client's request or
//! cancel reaches all the others.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::media::{MediaKind, MediaRef};

/// Default history length.
const MAX_RECENT_EVENTS: usize = 100;

// ---------------------------------------------------------------------------
// EventPayload
// ---------------------------------------------------------------------------

/// Payload describing what happened.
///
/// Tagged by a snake_case `type`; fields are camelCase like the rest of the
/// tracking API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventPayload {
    /// The cached status for a title was dropped; views should re-resolve it.
    StatusInvalidated {
        media_type: MediaKind,
        media_id: u64,
    },
    /// An acquisition request was accepted by the tracking service.
    RequestSubmitted {
        media_type: MediaKind,
        media_id: u64,
        request_id: Option<u64>,
    },
    /// A request was cancelled in the tracking service.
    RequestCancelled {
        request_id: u64,
    },
}

impl EventPayload {
    pub fn invalidated(media: MediaRef) -> Self {
        Self::StatusInvalidated {
            media_type: media.kind,
            media_id: media.id,
        }
    }

    /// The title this event concerns, if any.
    pub fn media(&self) -> Option<MediaRef> {
        match self {
            Self::StatusInvalidated {
                media_type,
                media_id,
            }
            | Self::RequestSubmitted {
                media_type,
                media_id,
                ..
            } => Some(MediaRef::new(*media_type, *media_id)),
            Self::RequestCancelled { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A timestamped event ready for broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event with a fresh UUID and the current timestamp.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast channel plus a bounded history of recent events.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    history: RwLock<VecDeque<Event>>,
    history_len: usize,
}

impl EventBus {
    /// Bus whose broadcast channel buffers `capacity` events per subscriber
    /// and keeps the last [`MAX_RECENT_EVENTS`] for replay.
    pub fn new(capacity: usize) -> Self {
        Self::with_history(capacity, MAX_RECENT_EVENTS)
    }

    pub fn with_history(capacity: usize, history_len: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            history: RwLock::new(VecDeque::with_capacity(history_len)),
            history_len,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Record the event, then hand it to every live subscriber.
    pub fn broadcast(&self, payload: EventPayload) {
        let event = Event::new(payload);
        tracing::debug!(event = ?event.payload, "broadcasting tracker event");

        {
            let mut history = self.history.write();
            if history.len() >= self.history_len {
                history.pop_back();
            }
            if self.history_len > 0 {
                history.push_front(event.clone());
            }
        }

        // Nobody listening is fine.
        let _ = self.tx.send(event);
    }

    /// Up to `n` past events, newest first.
    pub fn recent_events(&self, n: usize) -> Vec<Event> {
        self.recent_matching(n, |_| true)
    }

    /// Up to `n` past events accepted by `keep`, newest first.
    pub fn recent_matching(&self, n: usize, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.history
            .read()
            .iter()
            .filter(|event| keep(event))
            .take(n)
            .cloned()
            .collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.tx.receiver_count())
            .field("history", &self.history.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.broadcast(EventPayload::invalidated(MediaRef::movie(550)));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.payload.media(), Some(MediaRef::movie(550)));
    }

    #[test]
    fn recent_events_capped() {
        let bus = EventBus::new(256);
        for id in 0..150 {
            bus.broadcast(EventPayload::RequestCancelled { request_id: id });
        }
        assert_eq!(bus.recent_events(200).len(), MAX_RECENT_EVENTS);
    }

    #[test]
    fn recent_events_newest_first() {
        let bus = EventBus::new(16);
        for id in 1..=5 {
            bus.broadcast(EventPayload::RequestCancelled { request_id: id });
        }
        let recent = bus.recent_events(2);
        assert_eq!(
            recent[0].payload,
            EventPayload::RequestCancelled { request_id: 5 }
        );
        assert_eq!(
            recent[1].payload,
            EventPayload::RequestCancelled { request_id: 4 }
        );
    }

    #[test]
    fn replay_can_be_narrowed_to_one_title() {
        let bus = EventBus::new(16);
        bus.broadcast(EventPayload::invalidated(MediaRef::movie(550)));
        bus.broadcast(EventPayload::invalidated(MediaRef::series(1399)));
        bus.broadcast(EventPayload::invalidated(MediaRef::movie(550)));

        let fight_club =
            bus.recent_matching(10, |e| e.payload.media() == Some(MediaRef::movie(550)));
        assert_eq!(fight_club.len(), 2);
    }

    #[test]
    fn zero_history_keeps_nothing() {
        let bus = EventBus::with_history(4, 0);
        let mut rx = bus.subscribe();
        bus.broadcast(EventPayload::RequestCancelled { request_id: 1 });
        assert!(bus.recent_events(10).is_empty());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn no_subscribers_does_not_panic() {
        let bus = EventBus::new(4);
        bus.broadcast(EventPayload::invalidated(MediaRef::series(1399)));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn payload_wire_format() {
        let payload = EventPayload::RequestSubmitted {
            media_type: MediaKind::Series,
            media_id: 1399,
            request_id: Some(42),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "request_submitted");
        assert_eq!(json["mediaType"], "tv");
        assert_eq!(json["mediaId"], 1399);
        assert_eq!(json["requestId"], 42);
        assert!(json.get("media_id").is_none());
    }

    #[test]
    fn invalidation_uses_query_parameter_names() {
        let json = serde_json::to_value(EventPayload::invalidated(MediaRef::movie(550))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "status_invalidated", "mediaType": "movie", "mediaId": 550 })
        );

        let back: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.media(), Some(MediaRef::movie(550)));
    }

    #[test]
    fn cancelled_event_has_no_media() {
        let payload = EventPayload::RequestCancelled { request_id: 7 };
        assert_eq!(payload.media(), None);
    }
}
