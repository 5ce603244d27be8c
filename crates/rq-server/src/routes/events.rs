//! Server-Sent Events (SSE) handler.
//!
//! Streams tracker events from the [`rq_core::events::EventBus`] so that every
//! open view re-resolves a title as soon as any client requests or cancels
//! it. Recent events are replayed to late joiners and heartbeats keep idle
//! connections open.

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use rq_core::events::Event as BusEvent;
use rq_core::{MediaKind, MediaRef};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;

use crate::context::AppContext;

/// Past events of interest replayed on connect.
const REPLAY_LEN: usize = 50;

/// Optional narrowing to the events of a single title.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub media_type: Option<MediaKind>,
    pub media_id: Option<u64>,
}

impl EventsQuery {
    fn media(&self) -> Option<MediaRef> {
        Some(MediaRef::new(self.media_type?, self.media_id?))
    }
}

fn matches_media(event: &BusEvent, filter: Option<MediaRef>) -> bool {
    match (filter, event.payload.media()) {
        (None, _) => true,
        // Cancellations are keyed by request only; every view may care.
        (Some(_), None) => true,
        (Some(wanted), Some(media)) => wanted == media,
    }
}

fn to_sse(event: &BusEvent) -> Option<Event> {
    serde_json::to_string(event)
        .ok()
        .map(|data| Event::default().id(event.id.to_string()).data(data))
}

/// GET /api/events -- SSE stream of status events.
pub async fn events_handler(
    State(ctx): State<AppContext>,
    Query(params): Query<EventsQuery>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let filter = params.media();

    let recent = ctx
        .event_bus
        .recent_matching(REPLAY_LEN, |event| matches_media(event, filter));
    let mut rx = ctx.event_bus.subscribe();

    let stream = async_stream::stream! {
        for event in recent.iter().rev() {
            if let Some(sse) = to_sse(event) {
                yield Ok(sse);
            }
        }

        let mut heartbeat = tokio::time::interval(Duration::from_secs(15));

        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(event) => {
                            if matches_media(&event, filter) {
                                if let Some(sse) = to_sse(&event) {
                                    yield Ok(sse);
                                }
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            tracing::debug!("SSE client lagged by {n} events");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    yield Ok(Event::default()
                        .event("heartbeat")
                        .data(r#"{"type":"heartbeat"}"#));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rq_core::events::EventPayload;

    #[test]
    fn unfiltered_stream_passes_everything() {
        let event = BusEvent::new(EventPayload::invalidated(MediaRef::movie(550)));
        assert!(matches_media(&event, None));
    }

    #[test]
    fn filter_selects_title() {
        let event = BusEvent::new(EventPayload::invalidated(MediaRef::movie(550)));
        assert!(matches_media(&event, Some(MediaRef::movie(550))));
        assert!(!matches_media(&event, Some(MediaRef::series(550))));
    }

    #[test]
    fn cancellations_reach_filtered_views() {
        let event = BusEvent::new(EventPayload::RequestCancelled { request_id: 42 });
        assert!(matches_media(&event, Some(MediaRef::movie(550))));
    }

    #[test]
    fn query_needs_both_parts() {
        let query = EventsQuery {
            media_type: Some(MediaKind::Movie),
            media_id: None,
        };
        assert_eq!(query.media(), None);
    }
}
