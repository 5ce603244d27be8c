//! Shared test harness for integration tests.
//!
//! [`TestHarness`] stands up wiremock servers in place of the tracking service
//! and TMDB, builds a full [`AppContext`] pointed at them, and serves the real
//! router on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;

use rq_core::config::Config;
use rq_server::context::AppContext;
use rq_server::router::build_router;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TRACKING_KEY: &str = "tracking-test-key";
pub const CATALOG_KEY: &str = "catalog-test-key";

pub struct TestHarness {
    pub ctx: AppContext,
    pub addr: SocketAddr,
    /// Stand-in for the Overseerr instance.
    pub seerr: MockServer,
    /// Stand-in for the TMDB API.
    pub tmdb: MockServer,
    pub client: reqwest::Client,
}

impl TestHarness {
    /// Start both mock services and the server.
    pub async fn with_server() -> Self {
        let seerr = MockServer::start().await;
        let tmdb = MockServer::start().await;

        let config = config_for(&seerr, &tmdb);
        let ctx = AppContext::new(config).expect("harness config is complete");
        let app = build_router(ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            ctx,
            addr,
            seerr,
            tmdb,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    // -----------------------------------------------------------------------
    // Tracking service fixtures
    // -----------------------------------------------------------------------

    /// Serve `GET /api/v1/{kind}/{id}` with the given `mediaInfo.status`, or
    /// without `mediaInfo` when `None`.
    pub async fn mount_media(&self, kind: &str, id: u64, availability: Option<u8>) {
        let body = match availability {
            Some(status) => json!({ "id": id, "mediaInfo": { "id": 1, "status": status } }),
            None => json!({ "id": id }),
        };
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{kind}/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.seerr)
            .await;
    }

    /// Serve `GET /api/v1/request` with the given requests.
    pub async fn mount_requests(&self, results: Value) {
        Mock::given(method("GET"))
            .and(path("/api/v1/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageInfo": { "pages": 1, "page": 1 },
                "results": results,
            })))
            .mount(&self.seerr)
            .await;
    }
}

pub fn config_for(seerr: &MockServer, tmdb: &MockServer) -> Config {
    let mut config = Config::default();
    config.tracking.url = Some(seerr.uri());
    config.tracking.api_key = Some(TRACKING_KEY.into());
    config.tracking.timeout_secs = 2;
    config.catalog.base_url = tmdb.uri();
    config.catalog.api_key = Some(CATALOG_KEY.into());
    config
}

/// A request-list entry as Overseerr returns it.
pub fn pending_request(id: u64, kind: &str, tmdb_id: u64) -> Value {
    json!({
        "id": id,
        "status": 1,
        "media": { "tmdbId": tmdb_id, "mediaType": kind },
    })
}

/// A TMDB result page holding the given ids.
pub fn tmdb_page(ids: &[u64]) -> Value {
    let results: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({
        "page": 1,
        "results": results,
        "total_pages": 1,
        "total_results": ids.len(),
    })
}
