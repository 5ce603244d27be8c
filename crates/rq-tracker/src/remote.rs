//! Wire types exchanged with the request-tracking service (Overseerr API v1).

use rq_core::config::RequestDefaults;
use rq_core::{MediaKind, MediaRef};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Availability flag the tracking service keeps per title (`mediaInfo.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum RemoteAvailability {
    Unknown,
    Pending,
    Processing,
    PartiallyAvailable,
    Available,
    Deleted,
    Other(u8),
}

impl From<u8> for RemoteAvailability {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Unknown,
            2 => Self::Pending,
            3 => Self::Processing,
            4 => Self::PartiallyAvailable,
            5 => Self::Available,
            6 => Self::Deleted,
            other => Self::Other(other),
        }
    }
}

/// Response of `GET /api/v1/{movie|tv}/{id}`; only the availability part is read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaDetails {
    pub media_info: Option<MediaInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaInfo {
    pub status: RemoteAvailability,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request status as reported in the request list.
///
/// Overseerr reports a numeric code (1 = pending approval); some proxies
/// relabel it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RequestState {
    Code(u8),
    Label(String),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        match self {
            Self::Code(code) => *code == 1,
            Self::Label(label) => label.eq_ignore_ascii_case("pending"),
        }
    }
}

/// Title a request refers to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMedia {
    pub tmdb_id: Option<u64>,
    pub media_type: Option<String>,
}

/// One entry of `GET /api/v1/request`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRequest {
    pub id: u64,
    pub status: RequestState,
    pub media: RequestMedia,
}

impl RemoteRequest {
    /// Whether this is an open request for `media`.
    pub fn is_pending_for(&self, media: &MediaRef) -> bool {
        self.status.is_pending()
            && self.media.tmdb_id == Some(media.id)
            && self.media.media_type.as_deref() == Some(media.kind.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequestPage {
    #[serde(default)]
    pub results: Vec<RemoteRequest>,
}

/// Body of a successful `POST /api/v1/request`; only the id is read.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedRequest {
    pub id: Option<u64>,
}

/// Error body returned by the tracking service on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// RequestPayload
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub media_id: u64,
    pub media_type: MediaKind,
    /// `"all"` for series; absent for movies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<&'static str>,
    pub is4k: bool,
    pub user_id: u64,
    pub root_folder: String,
}

impl RequestPayload {
    /// Build the payload for `media` with the fixed request policy.
    ///
    /// A series asks for all of its seasons; a movie asks for itself.
    pub fn for_media(media: MediaRef, defaults: &RequestDefaults) -> Self {
        let (seasons, root_folder) = match media.kind {
            MediaKind::Series => (Some("all"), defaults.series_root_folder.clone()),
            MediaKind::Movie => (None, defaults.movie_root_folder.clone()),
        };
        Self {
            media_id: media.id,
            media_type: media.kind,
            seasons,
            is4k: defaults.is_4k,
            user_id: defaults.user_id,
            root_folder,
        }
    }
}
