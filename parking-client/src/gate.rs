//! Gate session - one gate page's worth of state
//!
//! Wires a [`ZoneStore`], a [`ConnectionManager`] and a [`CheckinFlow`] for a
//! single gate. Dropping the session stops the live channel.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use crate::api::ParkingApi;
use crate::audit::AuditLog;
use crate::checkin::CheckinFlow;
use crate::live::{LiveConnector, WsConnector};
use crate::session::{ConnectionManager, ConnectionStatus, SessionEvent};
use crate::store::ZoneStore;
use crate::{ClientConfig, ClientResult, Gate, HttpClient};

#[derive(Debug)]
pub struct GateSession {
    gate_id: String,
    manager: ConnectionManager,
    checkin: CheckinFlow,
}

impl GateSession {
    /// Build a session over the given transports; nothing runs until [`open`](Self::open)
    pub fn new(
        gate_id: impl Into<String>,
        api: Arc<dyn ParkingApi>,
        connector: Arc<dyn LiveConnector>,
        config: &ClientConfig,
    ) -> Self {
        let gate_id = gate_id.into();
        let store = ZoneStore::new();
        let manager = ConnectionManager::new(api.clone(), connector, store.clone())
            .with_audit_log(AuditLog::new(config.audit_capacity))
            .with_retry_delay(config.reconnect_delay);
        let checkin = CheckinFlow::new(api, store, gate_id.clone());

        Self {
            gate_id,
            manager,
            checkin,
        }
    }

    /// Session over REST and WebSocket using the configured endpoints
    pub fn connect(config: &ClientConfig, gate_id: impl Into<String>) -> ClientResult<Self> {
        let api = Arc::new(HttpClient::new(config)?);
        let connector = Arc::new(WsConnector::new(config.ws_url.clone()));
        Ok(Self::new(gate_id, api, connector, config))
    }

    pub fn gate_id(&self) -> &str {
        &self.gate_id
    }

    /// Start (or restart) the live session
    pub async fn open(&self) {
        self.manager.start(self.gate_id.clone()).await;
    }

    /// Stop the live session; idempotent
    pub async fn close(&self) {
        self.manager.stop().await;
    }

    pub fn checkin(&self) -> &CheckinFlow {
        &self.checkin
    }

    pub fn checkin_mut(&mut self) -> &mut CheckinFlow {
        &mut self.checkin
    }

    pub fn status(&self) -> ConnectionStatus {
        self.manager.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.manager.watch_status()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.manager.subscribe_events()
    }

    pub fn gate(&self) -> Option<Gate> {
        self.manager.gate()
    }

    pub fn store(&self) -> &ZoneStore {
        self.manager.store()
    }

    pub fn audit_log(&self) -> &AuditLog {
        self.manager.audit_log()
    }
}
