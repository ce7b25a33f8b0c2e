//! Shared types for the parking client
//!
//! Wire models, request/response DTOs and the live-channel protocol used by
//! the gate, checkpoint and admin consumers of the parking API.

pub mod client;
pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Live channel re-exports (for convenient access)
pub use message::{LiveMessage, ProtocolError};
