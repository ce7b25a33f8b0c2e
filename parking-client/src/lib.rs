//! Parking Client - gate, checkpoint and admin client for the parking API
//!
//! Keeps a live view of a gate's zones (REST snapshot + WebSocket updates)
//! and drives the check-in and checkout workflows against the backend.

pub mod admin;
pub mod api;
pub mod audit;
pub mod auth;
pub mod checkin;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod live;
pub mod session;
pub mod store;

pub use api::{ApiCall, Endpoint, MemoryApi, ParkingApi};
pub use audit::{AuditLog, AuditRecord, AuditSource};
pub use checkin::CheckinFlow;
pub use checkout::CheckoutFlow;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use gate::GateSession;
pub use http::HttpClient;
pub use live::{LiveChannel, LiveConnector};
pub use session::{ConnectionManager, ConnectionStatus, SessionEvent};
pub use store::ZoneStore;

// Re-export shared types for convenience
pub use shared::LiveMessage;
pub use shared::client::{CheckinRequest, CheckinResponse, CheckoutRequest, LoginResponse};
pub use shared::models::{
    CheckoutResult, Gate, Subscription, Ticket, TicketKind, UserRole, Zone,
};
