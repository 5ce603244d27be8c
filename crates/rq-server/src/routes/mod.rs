//! Route handlers for the HTTP API.

pub mod catalog;
pub mod events;
pub mod health;
pub mod status;
