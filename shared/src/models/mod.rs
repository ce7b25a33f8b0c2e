//! Data models for the parking domain
//!
//! Every type mirrors the JSON the backend sends (`camelCase` field names).
//! Counters and amounts are server snapshots; nothing here derives them.

pub mod audit;
pub mod category;
pub mod checkout;
pub mod employee;
pub mod gate;
pub mod schedule;
pub mod subscription;
pub mod ticket;
pub mod zone;

pub use audit::*;
pub use category::*;
pub use checkout::*;
pub use employee::*;
pub use gate::*;
pub use schedule::*;
pub use subscription::*;
pub use ticket::*;
pub use zone::*;
