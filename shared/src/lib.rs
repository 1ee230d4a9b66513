//! Shared types for the Bloom booking platform
//!
//! Common types used across crates: domain models, the unified
//! error-code system, the API response envelope, and id/time utilities.

pub mod error;
pub mod event;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use event::{EventEnvelope, EventType};
