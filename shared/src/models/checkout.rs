//! Checkout Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::zone::Zone;

/// Rate applied to a billing segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    Normal,
    Special,
}

/// One segment of the server-computed rate breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSegment {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub hours: f64,
    pub rate_mode: RateMode,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Checkout computation result (rendered only, never recomputed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub ticket_id: String,
    pub checkin_at: DateTime<Utc>,
    pub checkout_at: DateTime<Utc>,
    pub duration_hours: f64,
    #[serde(default)]
    pub breakdown: Vec<RateSegment>,
    pub amount: Decimal,
    pub zone_state: Zone,
}
