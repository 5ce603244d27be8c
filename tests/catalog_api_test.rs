//! Integration tests for the catalog proxy routes.

mod common;

use common::{tmdb_page, TestHarness, CATALOG_KEY};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn health_endpoint() {
    let h = TestHarness::with_server().await;
    let resp = h.client.get(h.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn trending_all_combines_movies_and_shows() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .and(query_param("api_key", CATALOG_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[550, 603])))
        .mount(&h.tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending/tv/week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[1399])))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/trending").await;
    assert_eq!(status, 200);
    assert_eq!(body["movies"]["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["shows"]["results"][0]["id"], 1399);
}

#[tokio::test]
async fn trending_honours_daily_window() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[872585])))
        .expect(2)
        .mount(&h.tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending/tv/day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[94997])))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/trending/movie?timeWindow=day").await;
    assert_eq!(status, 200);
    assert_eq!(body["results"][0]["id"], 872585);

    let (status, body) = h.get_json("/api/trending?timeWindow=day").await;
    assert_eq!(status, 200);
    assert_eq!(body["shows"]["results"][0]["id"], 94997);

    let (status, _) = h.get_json("/api/trending/movie?timeWindow=month").await;
    assert_eq!(status, 400);
    h.tmdb.verify().await;
}

#[tokio::test]
async fn trending_with_network_lists_network_shows() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/discover/tv"))
        .and(query_param("with_networks", "213"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[66732])))
        .expect(1)
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/trending?networkId=213").await;
    assert_eq!(status, 200);
    assert_eq!(body["results"][0]["id"], 66732);
}

#[tokio::test]
async fn network_failure_degrades_to_empty_page() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/discover/tv"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/network/213").await;
    assert_eq!(status, 200);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn search_requires_query() {
    let h = TestHarness::with_server().await;
    let (status, body) = h.get_json("/api/search").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Query parameter is required");
}

#[tokio::test]
async fn search_forwards_query() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "fight club"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[550])))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/search?query=fight%20club").await;
    assert_eq!(status, 200);
    assert_eq!(body["results"][0]["id"], 550);
}

#[tokio::test]
async fn details_and_unknown_title() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 550, "title": "Fight Club" })),
        )
        .mount(&h.tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/details/movie/550").await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Fight Club");

    let (status, body) = h.get_json("/api/details/movie/999999").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "The resource you requested could not be found.");
}

#[tokio::test]
async fn recommendations_for_title() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/tv/1399/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&[1402, 60059])))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/tv/1399/recommendations").await;
    assert_eq!(status, 200);
    assert_eq!(body["total_results"], 2);
}

#[tokio::test]
async fn season_only_for_series() {
    let h = TestHarness::with_server().await;
    Mock::given(method("GET"))
        .and(path("/tv/1399/season/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "season_number": 1,
            "episodes": [{ "episode_number": 1 }, { "episode_number": 2 }]
        })))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/tv/1399/season/1").await;
    assert_eq!(status, 200);
    assert_eq!(body["episodes"].as_array().unwrap().len(), 2);

    let (status, _) = h.get_json("/api/movie/550/season/1").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn provider_lists_movies_then_shows() {
    let h = TestHarness::with_server().await;
    let ten: Vec<u64> = (1..=10).collect();
    let ten_shows: Vec<u64> = (101..=110).collect();
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_watch_providers", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&ten)))
        .mount(&h.tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/discover/tv"))
        .and(query_param("with_watch_providers", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_page(&ten_shows)))
        .mount(&h.tmdb)
        .await;

    let (status, body) = h.get_json("/api/provider/8").await;
    assert_eq!(status, 200);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 20);
    assert_eq!(items[0]["media_type"], "movie");
    assert_eq!(items[19]["media_type"], "tv");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let h = TestHarness::with_server().await;
    let (status, body) = h.get_json("/api-docs/openapi.json").await;
    assert_eq!(status, 200);
    assert!(body["paths"]["/api/status"].is_object());
    assert!(body["paths"]["/api/request"].is_object());
}
