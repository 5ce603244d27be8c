//! Request-tracking route handlers: status lookup, invalidation, request,
//! and cancel.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rq_core::{Error, MediaKind, MediaRef, MediaStatus, StatusRecord};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Title selector in query strings.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MediaQuery {
    /// `movie` or `tv`.
    pub media_type: Option<String>,
    /// Catalog id of the title.
    pub media_id: Option<String>,
}

impl MediaQuery {
    fn media_ref(&self) -> Result<MediaRef, Error> {
        match (self.media_type.as_deref(), self.media_id.as_deref()) {
            (Some(kind), Some(id)) => MediaRef::parse(kind, id),
            _ => Err(Error::Validation("Media type and ID are required".into())),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: MediaStatus,
    /// Numeric form of `status` (1 unknown .. 6 not available).
    pub status_code: u8,
    pub media_id: u64,
    pub media_type: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

impl StatusResponse {
    fn new(media: MediaRef, record: StatusRecord) -> Self {
        Self {
            status: record.status,
            status_code: record.status.code(),
            media_id: media.id,
            media_type: media.kind,
            request_id: record.request_id,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub media_type: MediaKind,
    pub media_id: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CancelQuery {
    pub request_id: Option<u64>,
    pub media_type: Option<String>,
    pub media_id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub request_id: Option<u64>,
    pub media_type: Option<MediaKind>,
    pub media_id: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub success: bool,
    /// Status to show until the next resolve.
    pub status: MediaStatus,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/status
#[utoipa::path(
    get,
    path = "/api/status",
    params(MediaQuery),
    responses(
        (status = 200, description = "Current status of the title", body = StatusResponse),
        (status = 400, description = "Missing or invalid media type or id")
    )
)]
pub async fn get_status(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<MediaQuery>,
) -> Result<Json<StatusResponse>, AppError> {
    let media = params
        .media_ref()
        .map_err(|e| AppError::new(e).with_request_id(&request_id))?;
    let record = ctx.tracker.resolve(media).await;
    Ok(Json(StatusResponse::new(media, record)))
}

/// DELETE /api/status
#[utoipa::path(
    delete,
    path = "/api/status",
    params(MediaQuery),
    responses(
        (status = 204, description = "Cached status dropped"),
        (status = 400, description = "Missing or invalid media type or id")
    )
)]
pub async fn invalidate_status(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<MediaQuery>,
) -> Result<StatusCode, AppError> {
    let media = params
        .media_ref()
        .map_err(|e| AppError::new(e).with_request_id(&request_id))?;
    ctx.tracker.invalidate(media);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/request
#[utoipa::path(
    post,
    path = "/api/request",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Request accepted", body = SubmitResponse),
        (status = 400, description = "Invalid media id"),
        (status = 502, description = "Tracking service unreachable or malformed")
    )
)]
pub async fn submit_request(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    if body.media_id == 0 {
        return Err(AppError::new(Error::Validation("media id must be positive".into()))
            .with_request_id(&request_id));
    }
    let media = MediaRef::new(body.media_type, body.media_id);

    let ack = ctx
        .tracker
        .submit(media)
        .await
        .map_err(|e| AppError::new(e).with_request_id(&request_id))?;

    Ok(Json(SubmitResponse {
        success: true,
        request_id: ack.request_id,
    }))
}

/// DELETE /api/cancel
#[utoipa::path(
    delete,
    path = "/api/cancel",
    params(CancelQuery),
    responses(
        (status = 200, description = "Request cancelled", body = CancelResponse),
        (status = 400, description = "Request ID is required")
    )
)]
pub async fn cancel_by_query(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<CancelQuery>,
) -> Result<Json<CancelResponse>, AppError> {
    let media = match (params.media_type.as_deref(), params.media_id.as_deref()) {
        (Some(kind), Some(id)) => Some(
            MediaRef::parse(kind, id)
                .map_err(|e| AppError::new(e).with_request_id(&request_id))?,
        ),
        _ => None,
    };
    cancel(&ctx, &request_id, params.request_id, media).await
}

/// POST /api/request/cancel
#[utoipa::path(
    post,
    path = "/api/request/cancel",
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Request cancelled", body = CancelResponse),
        (status = 400, description = "Request ID is required")
    )
)]
pub async fn cancel_by_body(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, AppError> {
    let media = match (body.media_type, body.media_id) {
        (Some(kind), Some(id)) => Some(MediaRef::new(kind, id)),
        _ => None,
    };
    cancel(&ctx, &request_id, body.request_id, media).await
}

async fn cancel(
    ctx: &AppContext,
    http_request: &RequestId,
    tracking_request: Option<u64>,
    media: Option<MediaRef>,
) -> Result<Json<CancelResponse>, AppError> {
    let Some(tracking_request) = tracking_request.filter(|id| *id > 0) else {
        return Err(
            AppError::new(Error::Validation("Request ID is required".into()))
                .with_request_id(http_request),
        );
    };

    ctx.tracker
        .cancel(tracking_request, media)
        .await
        .map_err(|e| AppError::new(e).with_request_id(http_request))?;

    Ok(Json(CancelResponse {
        success: true,
        status: MediaStatus::NotAvailable,
    }))
}
