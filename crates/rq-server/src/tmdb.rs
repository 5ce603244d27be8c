//! TMDB (The Movie Database) API client.
//!
//! Backs the catalog routes: trending, popular, search, details, seasons,
//! recommendations, and the network/provider showcases. Responses are passed
//! through mostly untouched since the UI consumes TMDB's own shapes.
//! Rate-limited to stay under TMDB's API limits.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use rq_core::config::CatalogConfig;
use rq_core::{Error, MediaKind, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service name used in errors and logs.
pub const SERVICE: &str = "TMDB";

/// Titles shown per kind on a provider page.
const PROVIDER_SHOWCASE_LEN: usize = 10;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A page of TMDB results. Entries are kept as raw JSON objects.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TmdbPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl Default for TmdbPage {
    fn default() -> Self {
        Self {
            page: first_page(),
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

/// Trending window accepted by `/trending/{kind}/{window}`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbErrorBody {
    status_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    region: String,
    limiter: Arc<Limiter>,
}

impl TmdbClient {
    pub fn new(config: &CatalogConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
            language: config.language.clone(),
            region: config.region.clone(),
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<T> {
        self.limiter.until_ready().await;

        let url = format!("{}{path}", self.base_url);
        let mut params: Vec<(&str, &str)> =
            vec![("api_key", &self.api_key), ("language", &self.language)];
        params.extend_from_slice(extra_params);

        tracing::trace!(path, "TMDB request");
        let resp = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::remote_unavailable(SERVICE, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TmdbErrorBody>(&body)
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or_else(|| format!("TMDB returned {status}"));
            return Err(Error::remote_rejected(SERVICE, status, message));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::malformed(SERVICE, e))
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    pub async fn trending(&self, kind: MediaKind, window: TimeWindow) -> Result<TmdbPage> {
        self.get(&format!("/trending/{kind}/{}", window.as_str()), &[])
            .await
    }

    pub async fn popular(&self, kind: MediaKind, page: u32) -> Result<TmdbPage> {
        let page = page.to_string();
        self.get(&format!("/{kind}/popular"), &[("page", page.as_str())])
            .await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<TmdbPage> {
        let page = page.to_string();
        self.get("/search/multi", &[("query", query), ("page", page.as_str())])
            .await
    }

    pub async fn recommendations(&self, kind: MediaKind, id: u64) -> Result<TmdbPage> {
        self.get(&format!("/{kind}/{id}/recommendations"), &[]).await
    }

    // -----------------------------------------------------------------------
    // Details
    // -----------------------------------------------------------------------

    /// Full details with credits, videos, images, and watch providers.
    pub async fn details(&self, kind: MediaKind, id: u64) -> Result<Value> {
        self.get(
            &format!("/{kind}/{id}"),
            &[("append_to_response", "credits,videos,images,watch/providers")],
        )
        .await
    }

    /// A series season including its episodes.
    pub async fn season(&self, tv_id: u64, season_number: u32) -> Result<Value> {
        let season: Value = self
            .get(&format!("/tv/{tv_id}/season/{season_number}"), &[])
            .await?;
        if !season.get("episodes").is_some_and(Value::is_array) {
            return Err(Error::malformed(SERVICE, "season without episodes"));
        }
        Ok(season)
    }

    // -----------------------------------------------------------------------
    // Showcases
    // -----------------------------------------------------------------------

    /// Popular, well-rated series of a broadcast network.
    ///
    /// Failures degrade to an empty page.
    pub async fn network_shows(&self, network_id: u64) -> TmdbPage {
        let network_id = network_id.to_string();
        let result: Result<TmdbPage> = self
            .get(
                "/discover/tv",
                &[
                    ("with_networks", network_id.as_str()),
                    ("sort_by", "popularity.desc"),
                    ("vote_count.gte", "100"),
                    ("include_adult", "false"),
                    ("page", "1"),
                ],
            )
            .await;
        result.unwrap_or_else(|e| {
            tracing::warn!(network_id = %network_id, "Network discovery failed: {}", e);
            TmdbPage::default()
        })
    }

    /// Movies then series streamable on a watch provider in the configured
    /// region, each list topped up from popular titles, every entry tagged
    /// with its `media_type`.
    pub async fn provider_content(&self, provider_id: u64) -> Result<Vec<Value>> {
        let (movies, shows) = tokio::try_join!(
            self.provider_showcase(MediaKind::Movie, provider_id),
            self.provider_showcase(MediaKind::Series, provider_id),
        )?;
        Ok(movies.into_iter().chain(shows).collect())
    }

    async fn provider_showcase(&self, kind: MediaKind, provider_id: u64) -> Result<Vec<Value>> {
        let provider_id = provider_id.to_string();
        let discovered: TmdbPage = self
            .get(
                &format!("/discover/{kind}"),
                &[
                    ("with_watch_providers", provider_id.as_str()),
                    ("watch_region", self.region.as_str()),
                    ("sort_by", "popularity.desc"),
                ],
            )
            .await?;

        let mut items = discovered.results;
        items.truncate(PROVIDER_SHOWCASE_LEN);
        if items.len() < PROVIDER_SHOWCASE_LEN {
            let popular = self.popular(kind, 1).await?;
            top_up(&mut items, popular.results, PROVIDER_SHOWCASE_LEN);
        }

        for item in &mut items {
            if let Value::Object(map) = item {
                map.insert("media_type".into(), Value::from(kind.as_str()));
            }
        }
        Ok(items)
    }
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

fn item_id(item: &Value) -> Option<u64> {
    item.get("id").and_then(Value::as_u64)
}

/// Append entries of `extra` whose id is not already present until `items`
/// holds `len` entries.
fn top_up(items: &mut Vec<Value>, extra: Vec<Value>, len: usize) {
    for candidate in extra {
        if items.len() >= len {
            break;
        }
        let id = item_id(&candidate);
        if id.is_some() && items.iter().any(|existing| item_id(existing) == id) {
            continue;
        }
        items.push(candidate);
    }
}
