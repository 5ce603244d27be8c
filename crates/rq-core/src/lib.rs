//! rq-core: shared media types, errors, configuration, and event system.
//!
//! This crate is the foundational dependency for the other rq-* crates,
//! providing the title identifiers and lifecycle statuses exchanged with the
//! request-tracking service, a unified error type, application
//! configuration, and a broadcast event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
