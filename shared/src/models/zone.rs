//! Zone Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Zone entity (parking area with capacity counters and a rate category)
///
/// Counters are authoritative snapshots supplied by the server. The client
/// replaces whole entries on update and never recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub occupied: i32,
    pub free: i32,
    pub reserved: i32,
    pub available_for_visitors: i32,
    pub available_for_subscribers: i32,
    pub rate_normal: Decimal,
    pub rate_special: Decimal,
    pub open: bool,
    /// Whether the special rate currently applies (rush hour / vacation)
    #[serde(default)]
    pub special_active: bool,
    /// Optional monotonic version; only used when the server sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl Zone {
    /// Rate currently charged to visitors in this zone
    pub fn current_rate(&self) -> Decimal {
        if self.special_active {
            self.rate_special
        } else {
            self.rate_normal
        }
    }
}

/// Zone row of the admin parking-state report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminZone {
    pub id: String,
    pub name: String,
    pub occupied: i32,
    pub free: i32,
    pub reserved: i32,
    pub available_for_visitors: i32,
    pub available_for_subscribers: i32,
    #[serde(default)]
    pub subscriber_count: i32,
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
}
