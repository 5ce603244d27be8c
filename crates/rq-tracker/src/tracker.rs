//! Resolve, request, and cancel workflow for a title's acquisition status.

use std::sync::Arc;

use rq_core::config::RequestDefaults;
use rq_core::events::{EventBus, EventPayload};
use rq_core::{Ack, MediaRef, Result, StatusRecord};

use crate::cache::StatusCache;
use crate::client::TrackingService;
use crate::remote::RequestPayload;
use crate::rules::{derive_status, Observation};

/// Default number of recent requests scanned for a pending match.
pub const DEFAULT_RECENT_REQUESTS: u32 = 20;

/// Read-through status tracker over a [`TrackingService`].
///
/// Cloning is cheap; clones share the same cache and service.
#[derive(Clone)]
pub struct StatusTracker {
    service: Arc<dyn TrackingService>,
    cache: Arc<StatusCache>,
    defaults: RequestDefaults,
    recent_requests: u32,
    events: Option<Arc<EventBus>>,
}

impl StatusTracker {
    pub fn new(
        service: Arc<dyn TrackingService>,
        cache: Arc<StatusCache>,
        defaults: RequestDefaults,
    ) -> Self {
        Self {
            service,
            cache,
            defaults,
            recent_requests: DEFAULT_RECENT_REQUESTS,
            events: None,
        }
    }

    /// Publish invalidations and request lifecycle events on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Scan the `take` most recent requests when looking for a pending one.
    pub fn with_recent_requests(mut self, take: u32) -> Self {
        self.recent_requests = take;
        self
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Current status of `media`.
    ///
    /// Never fails: any remote error yields [`StatusRecord::unknown`], which is
    /// not cached so the next call retries.
    pub async fn resolve(&self, media: MediaRef) -> StatusRecord {
        if let Some(record) = self.cache.get(&media) {
            tracing::trace!(%media, status = %record.status, "status cache hit");
            return record;
        }

        match self.fetch(media).await {
            Ok(record) => {
                tracing::debug!(
                    media_type = %media.kind,
                    media_id = media.id,
                    status = %record.status,
                    request_id = ?record.request_id,
                    "Resolved status"
                );
                self.cache.insert(media, record);
                record
            }
            Err(e) => {
                tracing::warn!(
                    media_type = %media.kind,
                    media_id = media.id,
                    "Status lookup failed: {}",
                    e
                );
                StatusRecord::unknown()
            }
        }
    }

    async fn fetch(&self, media: MediaRef) -> Result<StatusRecord> {
        let (availability, requests) = tokio::try_join!(
            self.service.media_availability(media),
            self.service.recent_requests(self.recent_requests),
        )?;

        let pending_request = requests
            .iter()
            .find(|request| request.is_pending_for(&media))
            .map(|request| request.id);

        Ok(derive_status(&Observation {
            availability,
            pending_request,
        }))
    }

    /// Ask the tracking service to acquire `media`.
    ///
    /// The title is looked up first; a failed lookup aborts the submission.
    /// On failure the cache is left untouched.
    pub async fn submit(&self, media: MediaRef) -> Result<Ack> {
        self.service.media_availability(media).await?;

        let payload = RequestPayload::for_media(media, &self.defaults);
        let ack = self.service.create_request(&payload).await?;

        tracing::info!(
            media_type = %media.kind,
            media_id = media.id,
            request_id = ?ack.request_id,
            "Request submitted"
        );

        self.publish(EventPayload::RequestSubmitted {
            media_type: media.kind,
            media_id: media.id,
            request_id: ack.request_id,
        });
        self.invalidate(media);
        Ok(ack)
    }

    /// Cancel the request `request_id`.
    ///
    /// On success every cached title holding this request, plus `media` when
    /// given, is invalidated. On failure the cache is left untouched.
    pub async fn cancel(&self, request_id: u64, media: Option<MediaRef>) -> Result<()> {
        self.service.delete_request(request_id).await?;

        tracing::info!(request_id, media = ?media, "Request cancelled");
        self.publish(EventPayload::RequestCancelled { request_id });

        let mut refs = self.cache.refs_for_request(request_id);
        if let Some(media) = media {
            if !refs.contains(&media) {
                refs.push(media);
            }
        }
        for media in refs {
            self.invalidate(media);
        }
        Ok(())
    }

    /// Drop the cached status for `media` and tell every subscriber to
    /// re-resolve it.
    pub fn invalidate(&self, media: MediaRef) {
        let removed = self.cache.invalidate(&media);
        tracing::debug!(%media, removed, "Status invalidated");
        self.publish(EventPayload::invalidated(media));
    }

    fn publish(&self, payload: EventPayload) {
        if let Some(bus) = &self.events {
            bus.broadcast(payload);
        }
    }
}

impl std::fmt::Debug for StatusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusTracker")
            .field("cached", &self.cache.len())
            .field("recent_requests", &self.recent_requests)
            .finish()
    }
}
