//! Request/response DTOs of the parking REST API
//!
//! These types are shared by every consumer of the API (gate, checkpoint,
//! admin). Domain entities live in [`crate::models`].

use serde::{Deserialize, Serialize};

use crate::models::{Ticket, TicketKind, UserRole, Zone};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// User returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Raw role string; unknown roles are rejected by the caller
    pub role: String,
}

impl LoginUser {
    /// Parsed role, `None` for roles this client does not know
    pub fn role(&self) -> Option<UserRole> {
        match self.role.as_str() {
            "admin" => Some(UserRole::Admin),
            "employee" => Some(UserRole::Employee),
            _ => None,
        }
    }
}

// =============================================================================
// Ticket API DTOs
// =============================================================================

/// Check-in request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRequest {
    pub gate_id: String,
    pub zone_id: String,
    #[serde(rename = "type")]
    pub kind: TicketKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl CheckinRequest {
    pub fn visitor(gate_id: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            gate_id: gate_id.into(),
            zone_id: zone_id.into(),
            kind: TicketKind::Visitor,
            subscription_id: None,
        }
    }

    pub fn subscriber(
        gate_id: impl Into<String>,
        zone_id: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            gate_id: gate_id.into(),
            zone_id: zone_id.into(),
            kind: TicketKind::Subscriber,
            subscription_id: Some(subscription_id.into()),
        }
    }
}

/// Check-in response: the new ticket plus the zone after admission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinResponse {
    pub ticket: Ticket,
    pub zone_state: Zone,
}

/// Checkout request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub ticket_id: String,
    pub force_convert_to_visitor: bool,
}

// =============================================================================
// Admin API DTOs
// =============================================================================

/// Open/close zone request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneOpenRequest {
    pub open: bool,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_checkin_request_omits_subscription() {
        let req = CheckinRequest::visitor("gate_1", "zone_a");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"gateId": "gate_1", "zoneId": "zone_a", "type": "visitor"})
        );
    }

    #[test]
    fn test_subscriber_checkin_request_shape() {
        let req = CheckinRequest::subscriber("gate_1", "zone_a", "sub_001");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "subscriber");
        assert_eq!(json["subscriptionId"], "sub_001");
    }

    #[test]
    fn test_checkout_request_shape() {
        let req = CheckoutRequest {
            ticket_id: "t_001".into(),
            force_convert_to_visitor: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ticketId": "t_001", "forceConvertToVisitor": true})
        );
    }

    #[test]
    fn test_login_role_parsing() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"token": "abc", "user": {"id": "emp1", "username": "emp1", "role": "employee"}}"#,
        )
        .unwrap();
        assert_eq!(resp.user.role(), Some(UserRole::Employee));

        let resp: LoginResponse =
            serde_json::from_str(r#"{"token": "abc", "user": {"role": "auditor"}}"#).unwrap();
        assert_eq!(resp.user.role(), None);
    }
}
