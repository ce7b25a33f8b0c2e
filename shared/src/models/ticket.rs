//! Ticket Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketKind {
    Visitor,
    Subscriber,
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketKind::Visitor => write!(f, "visitor"),
            TicketKind::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// Ticket issued by a successful check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TicketKind,
    pub zone_id: String,
    pub gate_id: String,
    pub checkin_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl Ticket {
    /// Subscription to look up at checkout, if any
    pub fn linked_subscription(&self) -> Option<&str> {
        match self.kind {
            TicketKind::Subscriber => self.subscription_id.as_deref(),
            TicketKind::Visitor => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_type_field_name() {
        let json = r#"{
            "id": "t_001",
            "type": "subscriber",
            "zoneId": "zone_a",
            "gateId": "gate_1",
            "checkinAt": "2025-08-19T09:12:00Z",
            "subscriptionId": "sub_001"
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.kind, TicketKind::Subscriber);
        assert_eq!(ticket.linked_subscription(), Some("sub_001"));

        let out = serde_json::to_value(&ticket).unwrap();
        assert_eq!(out["type"], "subscriber");
    }

    #[test]
    fn test_visitor_ticket_has_no_linked_subscription() {
        let json = r#"{
            "id": "t_002", "type": "visitor", "zoneId": "zone_a",
            "gateId": "gate_1", "checkinAt": "2025-08-19T09:12:00Z",
            "subscriptionId": "sub_stale"
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.linked_subscription(), None);
    }
}
