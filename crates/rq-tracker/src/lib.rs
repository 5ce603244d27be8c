//! rq-tracker: availability status tracking for catalog titles.
//!
//! A title's acquisition status lives in the remote request-tracking service.
//! This crate reads it through, caches it, and drives the request and cancel
//! workflow:
//!
//! - [`cache`]: the injectable, per-instance [`StatusCache`].
//! - [`rules`]: the ordered status derivation rules.
//! - [`remote`]: wire types exchanged with the tracking service.
//! - [`client`]: the [`TrackingService`] trait and its HTTP implementation.
//! - [`tracker`]: [`StatusTracker`], which ties the above together.

pub mod cache;
pub mod client;
pub mod remote;
pub mod rules;
pub mod tracker;

pub use cache::StatusCache;
pub use client::{SeerrClient, TrackingService};
pub use remote::{RemoteAvailability, RemoteRequest, RequestPayload};
pub use rules::{derive_status, Observation};
pub use tracker::StatusTracker;
