//! Live channel protocol
//!
//! One JSON object per text frame: `{"type": <kind>, "payload": <object>}`.
//! Parsing is strict: unknown kinds and malformed payloads are errors, not
//! silently dropped frames.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::{AuditEntry, Zone};

/// Wire name of the subscribe message
pub const KIND_SUBSCRIBE: &str = "subscribe";
/// Wire name of the zone update message
pub const KIND_ZONE_UPDATE: &str = "zone-update";
/// Wire name of the admin update message
pub const KIND_ADMIN_UPDATE: &str = "admin-update";

/// Subscribe payload (client → server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    pub gate_id: String,
}

/// Live channel message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum LiveMessage {
    /// Client → server: start receiving updates for a gate
    Subscribe(SubscribePayload),
    /// Server → client: full replacement of one zone
    ZoneUpdate(Zone),
    /// Server → client: an admin changed something
    AdminUpdate(AuditEntry),
}

/// Protocol violation on the live channel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

impl LiveMessage {
    /// Build the subscribe message for a gate
    pub fn subscribe(gate_id: impl Into<String>) -> Self {
        LiveMessage::Subscribe(SubscribePayload {
            gate_id: gate_id.into(),
        })
    }

    /// Wire name of this message
    pub fn kind(&self) -> &'static str {
        match self {
            LiveMessage::Subscribe(_) => KIND_SUBSCRIBE,
            LiveMessage::ZoneUpdate(_) => KIND_ZONE_UPDATE,
            LiveMessage::AdminUpdate(_) => KIND_ADMIN_UPDATE,
        }
    }

    /// Parse one text frame
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        let invalid = |e: serde_json::Error| ProtocolError::InvalidPayload {
            kind: envelope.kind.clone(),
            reason: e.to_string(),
        };

        match envelope.kind.as_str() {
            KIND_SUBSCRIBE => serde_json::from_value(envelope.payload.clone())
                .map(LiveMessage::Subscribe)
                .map_err(invalid),
            KIND_ZONE_UPDATE => serde_json::from_value(envelope.payload.clone())
                .map(LiveMessage::ZoneUpdate)
                .map_err(invalid),
            KIND_ADMIN_UPDATE => serde_json::from_value(envelope.payload.clone())
                .map(LiveMessage::AdminUpdate)
                .map_err(invalid),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }

    /// Encode as one text frame
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for LiveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveMessage::Subscribe(p) => write!(f, "subscribe(gate={})", p.gate_id),
            LiveMessage::ZoneUpdate(z) => write!(f, "zone-update(zone={})", z.id),
            LiveMessage::AdminUpdate(a) => {
                write!(f, "admin-update({} {} {})", a.action, a.target_type, a.target_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE_UPDATE: &str = r#"{
        "type": "zone-update",
        "payload": {
            "id": "zone_a", "name": "Zone A", "categoryId": "cat_premium",
            "occupied": 4, "free": 6, "reserved": 1,
            "availableForVisitors": 5, "availableForSubscribers": 1,
            "rateNormal": 5, "rateSpecial": 7.5, "open": true
        }
    }"#;

    #[test]
    fn test_subscribe_wire_format() {
        let text = LiveMessage::subscribe("gate_1").to_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "subscribe", "payload": {"gateId": "gate_1"}})
        );
    }

    #[test]
    fn test_parse_zone_update() {
        match LiveMessage::parse(ZONE_UPDATE).unwrap() {
            LiveMessage::ZoneUpdate(zone) => {
                assert_eq!(zone.id, "zone_a");
                assert_eq!(zone.available_for_visitors, 5);
            }
            other => panic!("Expected ZoneUpdate, got {other}"),
        }
    }

    #[test]
    fn test_parse_admin_update() {
        let text = r#"{
            "type": "admin-update",
            "payload": {
                "adminId": "admin_1", "action": "zone-closed",
                "targetType": "zone", "targetId": "zone_a",
                "timestamp": "2025-08-19T10:00:00Z"
            }
        }"#;
        match LiveMessage::parse(text).unwrap() {
            LiveMessage::AdminUpdate(entry) => {
                assert_eq!(entry.action, "zone-closed");
                assert!(entry.details.is_none());
            }
            other => panic!("Expected AdminUpdate, got {other}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = LiveMessage::parse(r#"{"type": "heartbeat", "payload": {}}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType("heartbeat".into()));
    }

    #[test]
    fn test_bad_payload_is_rejected() {
        let err = LiveMessage::parse(r#"{"type": "zone-update", "payload": {"id": 1}}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload { ref kind, .. } if kind == "zone-update"));
    }

    #[test]
    fn test_non_json_frame_is_malformed() {
        let err = LiveMessage::parse("hello").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }
}
