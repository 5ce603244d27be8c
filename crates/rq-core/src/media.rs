//! Title identifiers and request lifecycle types.
//!
//! A title is addressed by its kind and its numeric catalog identifier
//! ([`MediaRef`]). Its acquisition lifecycle, as observed through the
//! request-tracking service, is a [`MediaStatus`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// Kind of title in the metadata catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum MediaKind {
    /// A single work.
    #[serde(rename = "movie")]
    Movie,
    /// A season-based, multi-part series.
    #[serde(rename = "tv", alias = "series")]
    Series,
}

impl MediaKind {
    /// Name used in catalog and tracking-service URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "tv" | "series" => Ok(Self::Series),
            other => Err(Error::Validation(format!("unsupported media type: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// MediaRef
// ---------------------------------------------------------------------------

/// Identifies a title in the metadata catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub id: u64,
}

impl MediaRef {
    pub fn new(kind: MediaKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Shorthand for a movie reference.
    pub fn movie(id: u64) -> Self {
        Self::new(MediaKind::Movie, id)
    }

    /// Shorthand for a series reference.
    pub fn series(id: u64) -> Self {
        Self::new(MediaKind::Series, id)
    }

    /// Parse a reference from its untyped parts, as received in query strings.
    ///
    /// The id must be a positive integer; whether the catalog knows it is not
    /// checked here.
    pub fn parse(kind: &str, id: &str) -> Result<Self> {
        let kind = kind.parse()?;
        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Validation(format!("invalid media id: {id}")))?;
        if id == 0 {
            return Err(Error::Validation("media id must be positive".into()));
        }
        Ok(Self { kind, id })
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

// ---------------------------------------------------------------------------
// MediaStatus
// ---------------------------------------------------------------------------

/// Lifecycle stage of a title's acquisition.
///
/// This is a read-through projection of remote state; it is never owned
/// locally.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    /// Not yet resolved, or resolution failed.
    #[default]
    Unknown,
    Pending,
    Processing,
    /// Declared by the tracking service; no derivation rule produces it.
    PartiallyAvailable,
    Available,
    NotAvailable,
}

impl MediaStatus {
    /// Numeric code used by the tracking service and the UI.
    pub fn code(&self) -> u8 {
        match self {
            Self::Unknown => 1,
            Self::Pending => 2,
            Self::Processing => 3,
            Self::PartiallyAvailable => 4,
            Self::Available => 5,
            Self::NotAvailable => 6,
        }
    }

    /// Whether the UI should offer a "request" control for this status.
    pub fn is_requestable(&self) -> bool {
        matches!(self, Self::Unknown | Self::NotAvailable)
    }

    /// Whether an acquisition is underway.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::PartiallyAvailable => write!(f, "partially_available"),
            Self::Available => write!(f, "available"),
            Self::NotAvailable => write!(f, "not_available"),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusRecord / Ack
// ---------------------------------------------------------------------------

/// Result of resolving a title's status.
///
/// `request_id` identifies the open request in the tracking service and is
/// what a cancel needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: MediaStatus,
    pub request_id: Option<u64>,
}

impl StatusRecord {
    pub fn new(status: MediaStatus, request_id: Option<u64>) -> Self {
        Self { status, request_id }
    }

    /// The record reported when resolution failed.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Acknowledgement of a successful request submission.
///
/// `request_id` is `None` when the tracking service answered with an empty
/// success body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub request_id: Option<u64>,
}
