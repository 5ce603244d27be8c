//! Application context shared by every route handler through Axum state.

use std::sync::Arc;

use rq_core::config::Config;
use rq_core::events::EventBus;
use rq_tracker::{SeerrClient, StatusCache, StatusTracker, TrackingService};

use crate::tmdb::TmdbClient;

/// Everything a handler needs. Cheap to clone; all members are shared.
///
/// Each context owns its own [`StatusCache`], so two contexts built in the
/// same process never see each other's entries.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tracker: StatusTracker,
    pub catalog: Arc<TmdbClient>,
    pub event_bus: Arc<EventBus>,
}

impl AppContext {
    /// Wire the context against the configured remote services.
    pub fn new(config: Config) -> rq_core::Result<Self> {
        let service = Arc::new(SeerrClient::new(&config.tracking)?);
        Ok(Self::with_tracking_service(config, service))
    }

    /// Wire the context with an explicit tracking service.
    pub fn with_tracking_service(config: Config, service: Arc<dyn TrackingService>) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let tracker = StatusTracker::new(
            service,
            Arc::new(StatusCache::new()),
            config.requests.clone(),
        )
        .with_recent_requests(config.tracking.recent_requests)
        .with_events(event_bus.clone());
        let catalog = Arc::new(TmdbClient::new(&config.catalog));

        Self {
            config: Arc::new(config),
            tracker,
            catalog,
            event_bus,
        }
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        self.tracker.cache()
    }
}
