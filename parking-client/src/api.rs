//! Parking API abstraction
//!
//! The workflows only see [`ParkingApi`]. [`crate::HttpClient`] implements it
//! over REST; [`MemoryApi`] implements it in-process for tests and demos.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::client::{CheckinRequest, CheckinResponse, CheckoutRequest};
use shared::models::{CheckoutResult, Gate, Subscription, Ticket, Zone};
use std::collections::{HashMap, VecDeque};

use crate::{ClientError, ClientResult};

/// Endpoints consumed by the gate and checkpoint workflows
#[async_trait]
pub trait ParkingApi: Send + Sync + std::fmt::Debug {
    /// Gate by id; `NotFound` when the gate list does not contain it
    async fn get_gate(&self, gate_id: &str) -> ClientResult<Gate>;
    async fn list_zones(&self, gate_id: &str) -> ClientResult<Vec<Zone>>;
    async fn check_in(&self, request: &CheckinRequest) -> ClientResult<CheckinResponse>;
    async fn get_subscription(&self, subscription_id: &str) -> ClientResult<Subscription>;
    async fn get_ticket(&self, ticket_id: &str) -> ClientResult<Ticket>;
    async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<CheckoutResult>;
}

/// Endpoint selector for scripted failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetGate,
    ListZones,
    CheckIn,
    GetSubscription,
    GetTicket,
    Checkout,
}

/// A call observed by [`MemoryApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetGate(String),
    ListZones(String),
    CheckIn(CheckinRequest),
    GetSubscription(String),
    GetTicket(String),
    Checkout(CheckoutRequest),
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiCall::GetGate(_) => Endpoint::GetGate,
            ApiCall::ListZones(_) => Endpoint::ListZones,
            ApiCall::CheckIn(_) => Endpoint::CheckIn,
            ApiCall::GetSubscription(_) => Endpoint::GetSubscription,
            ApiCall::GetTicket(_) => Endpoint::GetTicket,
            ApiCall::Checkout(_) => Endpoint::Checkout,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    gates: Vec<Gate>,
    zones: HashMap<String, Vec<Zone>>,
    subscriptions: HashMap<String, Subscription>,
    tickets: HashMap<String, Ticket>,
    checkins: VecDeque<CheckinResponse>,
    checkouts: VecDeque<CheckoutResult>,
    failures: HashMap<Endpoint, VecDeque<ClientError>>,
    calls: Vec<ApiCall>,
}

/// In-process [`ParkingApi`] with seeded data and scripted responses
///
/// Reads answer from seeded data. Check-in and checkout answer from queues
/// filled with `push_checkin` / `push_checkout`. A failure queued with
/// `fail_next` is returned before anything else for its endpoint.
#[derive(Debug, Default)]
pub struct MemoryApi {
    state: Mutex<MemoryState>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a gate and the zones listed for it
    pub fn with_gate(self, gate: Gate, zones: Vec<Zone>) -> Self {
        {
            let mut state = self.state.lock();
            state.zones.insert(gate.id.clone(), zones);
            state.gates.push(gate);
        }
        self
    }

    pub fn with_subscription(self, subscription: Subscription) -> Self {
        self.state
            .lock()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
        self
    }

    pub fn with_ticket(self, ticket: Ticket) -> Self {
        self.state.lock().tickets.insert(ticket.id.clone(), ticket);
        self
    }

    /// Replace the zone list served for a gate
    pub fn set_zones(&self, gate_id: &str, zones: Vec<Zone>) {
        self.state.lock().zones.insert(gate_id.to_string(), zones);
    }

    pub fn push_checkin(&self, response: CheckinResponse) {
        self.state.lock().checkins.push_back(response);
    }

    pub fn push_checkout(&self, result: CheckoutResult) {
        self.state.lock().checkouts.push_back(result);
    }

    /// Make the next call to `endpoint` fail with `error`
    pub fn fail_next(&self, endpoint: Endpoint, error: ClientError) {
        self.state
            .lock()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(error);
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Calls to one endpoint, in order
    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<ApiCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .cloned()
            .collect()
    }

    /// Record the call and pop a scripted failure, if any
    fn begin(&self, call: ApiCall) -> ClientResult<()> {
        let mut state = self.state.lock();
        let endpoint = call.endpoint();
        state.calls.push(call);
        match state.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn unscripted(what: &str) -> ClientError {
    ClientError::Server {
        status: 500,
        message: format!("No scripted {what} response"),
    }
}

#[async_trait]
impl ParkingApi for MemoryApi {
    async fn get_gate(&self, gate_id: &str) -> ClientResult<Gate> {
        self.begin(ApiCall::GetGate(gate_id.to_string()))?;
        self.state
            .lock()
            .gates
            .iter()
            .find(|g| g.id == gate_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Gate {gate_id}")))
    }

    async fn list_zones(&self, gate_id: &str) -> ClientResult<Vec<Zone>> {
        self.begin(ApiCall::ListZones(gate_id.to_string()))?;
        Ok(self
            .state
            .lock()
            .zones
            .get(gate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn check_in(&self, request: &CheckinRequest) -> ClientResult<CheckinResponse> {
        self.begin(ApiCall::CheckIn(request.clone()))?;
        self.state
            .lock()
            .checkins
            .pop_front()
            .ok_or_else(|| unscripted("check-in"))
    }

    async fn get_subscription(&self, subscription_id: &str) -> ClientResult<Subscription> {
        self.begin(ApiCall::GetSubscription(subscription_id.to_string()))?;
        self.state
            .lock()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Subscription {subscription_id}")))
    }

    async fn get_ticket(&self, ticket_id: &str) -> ClientResult<Ticket> {
        self.begin(ApiCall::GetTicket(ticket_id.to_string()))?;
        self.state
            .lock()
            .tickets
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Ticket {ticket_id}")))
    }

    async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<CheckoutResult> {
        self.begin(ApiCall::Checkout(request.clone()))?;
        self.state
            .lock()
            .checkouts
            .pop_front()
            .ok_or_else(|| unscripted("checkout"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> Gate {
        Gate {
            id: "gate_1".into(),
            name: "Main Entrance".into(),
            location: "North".into(),
            zone_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_memory_api_unknown_gate_is_not_found() {
        let api = MemoryApi::new().with_gate(gate(), vec![]);
        assert!(api.get_gate("gate_1").await.is_ok());
        assert!(matches!(
            api.get_gate("gate_9").await,
            Err(ClientError::NotFound(_))
        ));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let api = MemoryApi::new().with_gate(gate(), vec![]);
        api.fail_next(Endpoint::GetGate, ClientError::ConnectionLost("down".into()));

        assert!(api.get_gate("gate_1").await.is_err());
        assert!(api.get_gate("gate_1").await.is_ok());
        assert_eq!(api.calls_to(Endpoint::GetGate).len(), 2);
    }
}
