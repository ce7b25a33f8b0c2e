//! Check-in workflow for a gate
//!
//! Visitor and subscriber check-in. A successful check-in merges the returned
//! zone into the store right away, without waiting for the live channel to
//! echo it. A failed one leaves every piece of state untouched.

use shared::client::{CheckinRequest, CheckinResponse};
use shared::models::{Subscription, Ticket, Zone};
use std::sync::Arc;

use crate::api::ParkingApi;
use crate::store::ZoneStore;
use crate::{ClientError, ClientResult};

/// Whether a zone card can be picked for a visitor check-in
pub fn is_visitor_selectable(zone: &Zone) -> bool {
    zone.open && zone.available_for_visitors > 0
}

/// Optimistic subscriber eligibility filter.
///
/// Open zones with subscriber capacity, restricted to the subscription's
/// category once one is verified. The server still decides and may reject.
pub fn is_subscriber_eligible(zone: &Zone, subscription: Option<&Subscription>) -> bool {
    zone.open
        && zone.available_for_subscribers > 0
        && subscription.is_none_or(|s| zone.category_id == s.category)
}

/// Check-in state of one gate
#[derive(Debug)]
pub struct CheckinFlow {
    api: Arc<dyn ParkingApi>,
    store: ZoneStore,
    gate_id: String,
    selected_zone: Option<String>,
    subscription_id: String,
    subscription: Option<Subscription>,
    ticket: Option<Ticket>,
}

impl CheckinFlow {
    pub fn new(api: Arc<dyn ParkingApi>, store: ZoneStore, gate_id: impl Into<String>) -> Self {
        Self {
            api,
            store,
            gate_id: gate_id.into(),
            selected_zone: None,
            subscription_id: String::new(),
            subscription: None,
            ticket: None,
        }
    }

    pub fn gate_id(&self) -> &str {
        &self.gate_id
    }

    /// Select the zone to check into; it must be one of the gate's zones
    pub fn select_zone(&mut self, zone_id: &str) -> ClientResult<()> {
        if !self.store.contains(zone_id) {
            return Err(ClientError::Invalid(format!(
                "Zone {zone_id} is not part of this gate"
            )));
        }
        self.selected_zone = Some(zone_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_zone = None;
    }

    pub fn selected_zone(&self) -> Option<&str> {
        self.selected_zone.as_deref()
    }

    /// Ticket awaiting confirmation display
    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    /// Dismiss the ticket confirmation
    pub fn close_ticket(&mut self) -> Option<Ticket> {
        self.ticket.take()
    }

    pub fn verified_subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Subscription id as entered by the operator
    pub fn entered_subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Zones shown on the visitor tab (all of them; see [`is_visitor_selectable`])
    pub fn visitor_zones(&self) -> Vec<Zone> {
        self.store.snapshot()
    }

    /// Zones shown on the subscriber tab
    pub fn subscriber_zones(&self) -> Vec<Zone> {
        let subscription = self.subscription.as_ref();
        self.store
            .get_filtered(|z| is_subscriber_eligible(z, subscription))
            .to_vec()
    }

    fn require_zone(&self) -> ClientResult<String> {
        self.selected_zone
            .clone()
            .ok_or_else(|| ClientError::Invalid("Please select a zone".to_string()))
    }

    /// Visitor check-in into the selected zone
    pub async fn check_in_visitor(&mut self) -> ClientResult<&Ticket> {
        let zone_id = self.require_zone()?;
        let request = CheckinRequest::visitor(self.gate_id.clone(), zone_id);

        let response = self.api.check_in(&request).await.inspect_err(|e| {
            tracing::warn!(gate_id = %self.gate_id, zone_id = %request.zone_id, "Visitor check-in failed: {e}");
        })?;

        Ok(self.apply(response))
    }

    /// Look up a subscription and accept it only when active
    pub async fn verify_subscription(&mut self, subscription_id: &str) -> ClientResult<&Subscription> {
        self.subscription = None;
        self.subscription_id = subscription_id.trim().to_string();

        if self.subscription_id.is_empty() {
            return Err(ClientError::Invalid(
                "Please enter subscription ID".to_string(),
            ));
        }

        let subscription = self.api.get_subscription(&self.subscription_id).await?;
        if !subscription.active {
            tracing::info!(subscription_id = %subscription.id, "Subscription is not active");
            return Err(ClientError::Inactive(subscription.id));
        }

        Ok(self.subscription.insert(subscription))
    }

    /// Subscriber check-in into the selected zone with the verified subscription
    pub async fn check_in_subscriber(&mut self) -> ClientResult<&Ticket> {
        let zone_id = self.require_zone()?;
        let subscription_id = self
            .subscription
            .as_ref()
            .map(|s| s.id.clone())
            .ok_or_else(|| ClientError::Invalid("Please verify a subscription first".to_string()))?;

        let request =
            CheckinRequest::subscriber(self.gate_id.clone(), zone_id, subscription_id);

        let response = self.api.check_in(&request).await.inspect_err(|e| {
            tracing::warn!(gate_id = %self.gate_id, zone_id = %request.zone_id, "Subscriber check-in failed: {e}");
        })?;

        self.subscription = None;
        self.subscription_id.clear();
        Ok(self.apply(response))
    }

    fn apply(&mut self, response: CheckinResponse) -> &Ticket {
        let CheckinResponse { ticket, zone_state } = response;
        tracing::info!(
            ticket_id = %ticket.id,
            kind = %ticket.kind,
            zone_id = %zone_state.id,
            "Checked in"
        );
        self.store.upsert_by_id(zone_state);
        self.selected_zone = None;
        self.ticket.insert(ticket)
    }
}
