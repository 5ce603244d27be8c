//! Axum router construction.
//!
//! Builds the full application router with the tracking and catalog route
//! groups, middleware layers, API docs, and optional static file serving.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::status::get_status,
        routes::status::invalidate_status,
        routes::status::submit_request,
        routes::status::cancel_by_query,
        routes::status::cancel_by_body,
        routes::catalog::trending,
        routes::catalog::trending_kind,
        routes::catalog::popular,
        routes::catalog::search,
        routes::catalog::details,
        routes::catalog::recommendations,
        routes::catalog::season,
        routes::catalog::network,
        routes::catalog::provider,
    ),
    components(schemas(
        routes::status::StatusResponse,
        routes::status::SubmitRequest,
        routes::status::SubmitResponse,
        routes::status::CancelRequest,
        routes::status::CancelResponse,
        routes::catalog::TrendingBoth,
        crate::tmdb::TmdbPage,
        crate::tmdb::TimeWindow,
        rq_core::MediaKind,
        rq_core::MediaStatus,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let tracking_routes = Router::new()
        .route(
            "/status",
            get(routes::status::get_status).delete(routes::status::invalidate_status),
        )
        .route("/request", post(routes::status::submit_request))
        .route("/request/cancel", post(routes::status::cancel_by_body))
        .route("/cancel", delete(routes::status::cancel_by_query))
        .route("/events", get(routes::events::events_handler));

    let catalog_routes = Router::new()
        .route("/trending", get(routes::catalog::trending))
        .route("/trending/{mediaType}", get(routes::catalog::trending_kind))
        .route("/popular/{mediaType}", get(routes::catalog::popular))
        .route("/search", get(routes::catalog::search))
        .route("/details/{mediaType}/{id}", get(routes::catalog::details))
        .route(
            "/{mediaType}/{id}/recommendations",
            get(routes::catalog::recommendations),
        )
        .route(
            "/{mediaType}/{id}/season/{seasonNumber}",
            get(routes::catalog::season),
        )
        .route("/network/{networkId}", get(routes::catalog::network))
        .route("/provider/{providerId}", get(routes::catalog::provider));

    let api = tracking_routes.merge(catalog_routes);

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for the UI build.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!("Static directory {:?} does not exist", dir);
        }
    }

    app
}
