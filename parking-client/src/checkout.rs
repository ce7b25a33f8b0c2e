//! Checkpoint checkout workflow
//!
//! Ticket lookup, best-effort subscription lookup (for the operator's plate
//! comparison), then the server-side checkout computation.

use shared::client::CheckoutRequest;
use shared::models::{CheckoutResult, Subscription, Ticket, TicketKind};
use std::sync::Arc;

use crate::api::ParkingApi;
use crate::store::ZoneStore;
use crate::{ClientError, ClientResult};

/// Checkout state of one checkpoint
#[derive(Debug)]
pub struct CheckoutFlow {
    api: Arc<dyn ParkingApi>,
    store: ZoneStore,
    ticket_id: String,
    ticket: Option<Ticket>,
    subscription: Option<Subscription>,
    result: Option<CheckoutResult>,
}

impl CheckoutFlow {
    pub fn new(api: Arc<dyn ParkingApi>, store: ZoneStore) -> Self {
        Self {
            api,
            store,
            ticket_id: String::new(),
            ticket: None,
            subscription: None,
            result: None,
        }
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn result(&self) -> Option<&CheckoutResult> {
        self.result.as_ref()
    }

    /// Check a ticket out.
    ///
    /// A result for another ticket is dropped up front; a result for the same
    /// ticket stays on display, with its ticket and subscription, until a new
    /// one replaces it.
    pub async fn checkout(
        &mut self,
        ticket_id: &str,
        force_convert_to_visitor: bool,
    ) -> ClientResult<&CheckoutResult> {
        let ticket_id = ticket_id.trim();
        if ticket_id.is_empty() {
            return Err(ClientError::Invalid("Please enter ticket ID".to_string()));
        }

        if self.ticket_id != ticket_id {
            self.ticket = None;
            self.subscription = None;
            self.result = None;
            self.ticket_id = ticket_id.to_string();
        }

        // Held ticket and subscription stay until fresh lookups replace them
        let ticket = self.api.get_ticket(ticket_id).await?;

        let subscription = match ticket.linked_subscription() {
            Some(subscription_id) => match self.api.get_subscription(subscription_id).await {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    tracing::warn!(
                        ticket_id,
                        subscription_id,
                        "Subscription lookup failed, continuing checkout: {e}"
                    );
                    self.subscription
                        .take()
                        .filter(|held| held.id == subscription_id)
                }
            },
            None => None,
        };
        self.subscription = subscription;
        self.ticket = Some(ticket);

        let request = CheckoutRequest {
            ticket_id: ticket_id.to_string(),
            force_convert_to_visitor,
        };
        let result = self.api.checkout(&request).await.inspect_err(|e| {
            tracing::warn!(ticket_id, force_convert_to_visitor, "Checkout failed: {e}");
        })?;

        tracing::info!(
            ticket_id,
            amount = %result.amount,
            segments = result.breakdown.len(),
            force_convert_to_visitor,
            "Checked out"
        );
        self.store.upsert_by_id(result.zone_state.clone());
        Ok(self.result.insert(result))
    }

    /// Visitor conversion is offered once a subscriber ticket was checked out
    pub fn can_convert_to_visitor(&self) -> bool {
        self.result.is_some()
            && self
                .ticket
                .as_ref()
                .is_some_and(|t| t.kind == TicketKind::Subscriber)
    }

    /// Re-run checkout for the same ticket, billed at visitor rates
    pub async fn convert_to_visitor(&mut self) -> ClientResult<&CheckoutResult> {
        if !self.can_convert_to_visitor() {
            return Err(ClientError::Invalid(
                "Visitor conversion requires a completed subscriber checkout".to_string(),
            ));
        }
        let ticket_id = self.ticket_id.clone();
        self.checkout(&ticket_id, true).await
    }

    /// Whether the presented plate is registered on the ticket's subscription
    ///
    /// `None` when no subscription was fetched.
    pub fn plate_matches(&self, plate: &str) -> Option<bool> {
        self.subscription
            .as_ref()
            .map(|s| s.find_car(plate).is_some())
    }

    /// Clear ticket, result, subscription and entered id
    pub fn reset(&mut self) {
        self.ticket_id.clear();
        self.ticket = None;
        self.subscription = None;
        self.result = None;
    }
}
