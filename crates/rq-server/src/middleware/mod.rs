//! Axum middleware layers.

pub mod request_id;
