//! Catalog route handlers, proxied to TMDB.

use axum::extract::{Path, Query, State};
use axum::Json;
use rq_core::{Error, MediaKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::AppContext;
use crate::error::AppError;
use crate::tmdb::{TimeWindow, TmdbPage};

fn parse_kind(raw: &str) -> Result<MediaKind, Error> {
    raw.parse()
}

fn parse_id(raw: &str, what: &str) -> Result<u64, Error> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::Validation(format!("invalid {what}: {raw}")))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrendingQuery {
    /// `all` (default), `movie`, or `tv`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Switches to the popular series of this network.
    pub network_id: Option<u64>,
    /// `day` or `week` (default).
    pub time_window: Option<TimeWindow>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    /// `day` or `week` (default).
    pub time_window: Option<TimeWindow>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TrendingBoth {
    pub movies: TmdbPage,
    pub shows: TmdbPage,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
}

/// GET /api/trending
#[utoipa::path(
    get,
    path = "/api/trending",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Trending titles for the window, or a network's popular series", body = Object)
    )
)]
pub async fn trending(
    State(ctx): State<AppContext>,
    Query(params): Query<TrendingQuery>,
) -> Result<Json<Value>, AppError> {
    if let Some(network_id) = params.network_id {
        let page = ctx.catalog.network_shows(network_id).await;
        return Ok(Json(to_json(&page)?));
    }

    let window = params.time_window.unwrap_or_default();
    match params.kind.as_deref().unwrap_or("all") {
        "all" => {
            let (movies, shows) = tokio::try_join!(
                ctx.catalog.trending(MediaKind::Movie, window),
                ctx.catalog.trending(MediaKind::Series, window),
            )?;
            Ok(Json(to_json(&TrendingBoth { movies, shows })?))
        }
        other => {
            let page = ctx.catalog.trending(parse_kind(other)?, window).await?;
            Ok(Json(to_json(&page)?))
        }
    }
}

/// GET /api/trending/{mediaType}
#[utoipa::path(
    get,
    path = "/api/trending/{mediaType}",
    params(("mediaType" = String, Path, description = "movie or tv"), WindowQuery),
    responses((status = 200, description = "Trending page for the window", body = TmdbPage))
)]
pub async fn trending_kind(
    State(ctx): State<AppContext>,
    Path(media_type): Path<String>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<TmdbPage>, AppError> {
    let kind = parse_kind(&media_type)?;
    let window = params.time_window.unwrap_or_default();
    Ok(Json(ctx.catalog.trending(kind, window).await?))
}

/// GET /api/popular/{mediaType}
#[utoipa::path(
    get,
    path = "/api/popular/{mediaType}",
    params(("mediaType" = String, Path, description = "movie or tv"), PageQuery),
    responses((status = 200, description = "Popular titles", body = TmdbPage))
)]
pub async fn popular(
    State(ctx): State<AppContext>,
    Path(media_type): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Json<TmdbPage>, AppError> {
    let kind = parse_kind(&media_type)?;
    let page = params.page.unwrap_or(1).max(1);
    Ok(Json(ctx.catalog.popular(kind, page).await?))
}

/// GET /api/search
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Movies, series, and people matching the query", body = TmdbPage),
        (status = 400, description = "Query parameter is required")
    )
)]
pub async fn search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<TmdbPage>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| Error::Validation("Query parameter is required".into()))?;
    let page = params.page.unwrap_or(1).max(1);
    Ok(Json(ctx.catalog.search(query, page).await?))
}

/// GET /api/details/{mediaType}/{id}
#[utoipa::path(
    get,
    path = "/api/details/{mediaType}/{id}",
    params(
        ("mediaType" = String, Path, description = "movie or tv"),
        ("id" = u64, Path, description = "Catalog id")
    ),
    responses(
        (status = 200, description = "Details with credits, videos, images, and providers", body = Object),
        (status = 404, description = "Unknown title")
    )
)]
pub async fn details(
    State(ctx): State<AppContext>,
    Path((media_type, id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_kind(&media_type)?;
    let id = parse_id(&id, "media id")?;
    Ok(Json(ctx.catalog.details(kind, id).await?))
}

/// GET /api/{mediaType}/{id}/recommendations
#[utoipa::path(
    get,
    path = "/api/{mediaType}/{id}/recommendations",
    params(
        ("mediaType" = String, Path, description = "movie or tv"),
        ("id" = u64, Path, description = "Catalog id")
    ),
    responses((status = 200, description = "Recommended titles", body = TmdbPage))
)]
pub async fn recommendations(
    State(ctx): State<AppContext>,
    Path((media_type, id)): Path<(String, String)>,
) -> Result<Json<TmdbPage>, AppError> {
    let kind = parse_kind(&media_type)?;
    let id = parse_id(&id, "media id")?;
    Ok(Json(ctx.catalog.recommendations(kind, id).await?))
}

/// GET /api/tv/{id}/season/{seasonNumber}
#[utoipa::path(
    get,
    path = "/api/{mediaType}/{id}/season/{seasonNumber}",
    params(
        ("mediaType" = String, Path, description = "tv (or series)"),
        ("id" = u64, Path, description = "Series id"),
        ("seasonNumber" = u32, Path, description = "Season number, 0 for specials")
    ),
    responses((status = 200, description = "Season with its episodes", body = Object))
)]
pub async fn season(
    State(ctx): State<AppContext>,
    Path((media_type, id, season_number)): Path<(String, String, String)>,
) -> Result<Json<Value>, AppError> {
    if parse_kind(&media_type)? != MediaKind::Series {
        return Err(Error::Validation(format!("{media_type} has no seasons")).into());
    }
    let id = parse_id(&id, "series id")?;
    let season_number = season_number
        .parse::<u32>()
        .map_err(|_| Error::Validation(format!("invalid season number: {season_number}")))?;
    Ok(Json(ctx.catalog.season(id, season_number).await?))
}

/// GET /api/network/{networkId}
#[utoipa::path(
    get,
    path = "/api/network/{networkId}",
    params(("networkId" = u64, Path, description = "TMDB network id")),
    responses((status = 200, description = "Popular series of the network", body = TmdbPage))
)]
pub async fn network(
    State(ctx): State<AppContext>,
    Path(network_id): Path<String>,
) -> Result<Json<TmdbPage>, AppError> {
    let network_id = parse_id(&network_id, "network id")?;
    Ok(Json(ctx.catalog.network_shows(network_id).await))
}

/// GET /api/provider/{providerId}
#[utoipa::path(
    get,
    path = "/api/provider/{providerId}",
    params(("providerId" = u64, Path, description = "TMDB watch provider id")),
    responses((status = 200, description = "Movies then series on the provider", body = Vec<Object>))
)]
pub async fn provider(
    State(ctx): State<AppContext>,
    Path(provider_id): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let provider_id = parse_id(&provider_id, "provider id")?;
    Ok(Json(ctx.catalog.provider_content(provider_id).await?))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::Internal(e.to_string()))
}
