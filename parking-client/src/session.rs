//! Connection manager - keeps a gate's zones live
//!
//! 1. Fetch the gate descriptor
//! 2. Fetch the gate's zones and replace the store contents
//! 3. Open the live channel and subscribe to the gate
//! 4. Apply zone updates to the store in arrival order
//! 5. On any failure or close, wait a fixed delay and start over from 1
//!
//! One session task runs at a time. `start` stops the previous session first,
//! `stop` (and `Drop`) cancels the task, which closes the channel and abandons
//! any pending retry.

use parking_lot::RwLock;
use shared::LiveMessage;
use shared::models::{AuditEntry, Gate};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ParkingApi;
use crate::audit::AuditLog;
use crate::config::DEFAULT_RECONNECT_DELAY;
use crate::live::{LiveChannel, LiveConnector};
use crate::store::ZoneStore;
use crate::{ClientError, ClientResult};

/// Session event buffer
const EVENT_CAPACITY: usize = 256;

/// Live channel status of a gate session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Observable session events, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StatusChanged(ConnectionStatus),
    GateLoaded(Gate),
    ZonesReplaced(usize),
    ZoneUpdated { zone_id: String, applied: bool },
    AdminUpdate(AuditEntry),
    ProtocolError(String),
}

#[derive(Debug)]
struct SessionShared {
    status: watch::Sender<ConnectionStatus>,
    events: broadcast::Sender<SessionEvent>,
    gate: RwLock<Option<Gate>>,
}

impl SessionShared {
    fn new() -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            status,
            events,
            gate: RwLock::new(None),
        }
    }

    fn set_status(&self, next: ConnectionStatus) {
        let changed = self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            tracing::debug!(status = %next, "Connection status changed");
            self.emit(SessionEvent::StatusChanged(next));
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[derive(Debug)]
struct RunningSession {
    gate_id: String,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl RunningSession {
    async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!(gate_id = %self.gate_id, "Gate session task panicked: {e}");
            }
        }
    }
}

/// Owns the live channel and retry timer of one gate session
#[derive(Debug)]
pub struct ConnectionManager {
    api: Arc<dyn ParkingApi>,
    connector: Arc<dyn LiveConnector>,
    store: ZoneStore,
    audit: AuditLog,
    retry_delay: Duration,
    shared: Arc<SessionShared>,
    running: Mutex<Option<RunningSession>>,
}

impl ConnectionManager {
    pub fn new(
        api: Arc<dyn ParkingApi>,
        connector: Arc<dyn LiveConnector>,
        store: ZoneStore,
    ) -> Self {
        Self {
            api,
            connector,
            store,
            audit: AuditLog::default(),
            retry_delay: DEFAULT_RECONNECT_DELAY,
            shared: Arc::new(SessionShared::new()),
            running: Mutex::new(None),
        }
    }

    /// Use a shared audit log instead of a private one
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Set the fixed delay between session restarts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Start a session for `gate_id`, stopping any running session first
    pub async fn start(&self, gate_id: impl Into<String>) {
        let gate_id = gate_id.into();
        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            tracing::info!(
                previous = %previous.gate_id,
                next = %gate_id,
                "Replacing running gate session"
            );
            previous.shutdown().await;
            self.reset_state();
        }

        self.shared.set_status(ConnectionStatus::Connecting);

        let shutdown = CancellationToken::new();
        let worker = SessionWorker {
            gate_id: gate_id.clone(),
            api: self.api.clone(),
            connector: self.connector.clone(),
            store: self.store.clone(),
            audit: self.audit.clone(),
            shared: self.shared.clone(),
            retry_delay: self.retry_delay,
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(worker.run());

        *running = Some(RunningSession {
            gate_id,
            shutdown,
            task,
        });
    }

    /// Stop the session: close the channel, cancel any pending retry.
    ///
    /// Safe to call any number of times.
    pub async fn stop(&self) {
        let previous = self.running.lock().await.take();
        if let Some(previous) = previous {
            tracing::info!(gate_id = %previous.gate_id, "Stopping gate session");
            previous.shutdown().await;
            self.reset_state();
        }
    }

    /// Whether a session task is alive
    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    fn reset_state(&self) {
        *self.shared.gate.write() = None;
        self.store.clear();
        self.shared.set_status(ConnectionStatus::Disconnected);
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Gate descriptor of the current session, once fetched
    pub fn gate(&self) -> Option<Gate> {
        self.shared.gate.read().clone()
    }

    pub fn store(&self) -> &ZoneStore {
        &self.store
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.shutdown.cancel();
        }
    }
}

enum Frame {
    Shutdown,
    Received(Option<ClientResult<String>>),
}

enum ChannelEnd {
    Shutdown,
    Lost,
}

/// Body of the session task
struct SessionWorker {
    gate_id: String,
    api: Arc<dyn ParkingApi>,
    connector: Arc<dyn LiveConnector>,
    store: ZoneStore,
    audit: AuditLog,
    shared: Arc<SessionShared>,
    retry_delay: Duration,
    shutdown: CancellationToken,
}

impl SessionWorker {
    /// Main run loop - establish, pump frames, retry after a fixed delay
    async fn run(self) {
        tracing::info!(gate_id = %self.gate_id, "Gate session started");

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            self.shared.set_status(ConnectionStatus::Connecting);

            let established = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.establish() => result,
            };

            match established {
                Ok(channel) => {
                    if let ChannelEnd::Shutdown = self.pump(channel).await {
                        break;
                    }
                }
                Err(e) if e.is_connection_error() => {
                    tracing::info!(gate_id = %self.gate_id, "Live endpoint unreachable: {e}");
                }
                Err(e) => {
                    tracing::warn!(gate_id = %self.gate_id, "Gate session start failed: {e}");
                }
            }

            self.shared.set_status(ConnectionStatus::Disconnected);
            tracing::info!(
                gate_id = %self.gate_id,
                delay_ms = self.retry_delay.as_millis() as u64,
                "Restarting gate session after delay"
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.retry_delay) => {},
            }
        }

        self.shared.set_status(ConnectionStatus::Disconnected);
        tracing::info!(gate_id = %self.gate_id, "Gate session stopped");
    }

    /// Snapshot fetch, channel open, subscribe
    async fn establish(&self) -> ClientResult<Box<dyn LiveChannel>> {
        let gate = self.api.get_gate(&self.gate_id).await?;
        tracing::debug!(gate_id = %gate.id, name = %gate.name, "Gate loaded");
        *self.shared.gate.write() = Some(gate.clone());
        self.shared.emit(SessionEvent::GateLoaded(gate));

        let zones = self.api.list_zones(&self.gate_id).await?;
        let count = zones.len();
        self.store.replace_all(zones);
        self.shared.emit(SessionEvent::ZonesReplaced(count));

        let mut channel = self.connector.connect().await?;
        self.shared.set_status(ConnectionStatus::Connected);
        channel
            .send(&LiveMessage::subscribe(self.gate_id.clone()))
            .await?;
        tracing::info!(gate_id = %self.gate_id, zones = count, "Subscribed to gate updates");

        Ok(channel)
    }

    /// Process frames until the channel ends or the session is stopped
    async fn pump(&self, mut channel: Box<dyn LiveChannel>) -> ChannelEnd {
        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => Frame::Shutdown,
                frame = channel.recv() => Frame::Received(frame),
            };

            match frame {
                Frame::Shutdown => {
                    if let Err(e) = channel.close().await {
                        tracing::debug!("Live channel close failed: {e}");
                    }
                    return ChannelEnd::Shutdown;
                }
                Frame::Received(Some(Ok(text))) => self.handle_frame(&text),
                Frame::Received(Some(Err(e))) => {
                    tracing::warn!(gate_id = %self.gate_id, "Live channel error: {e}");
                    let _ = channel.close().await;
                    return ChannelEnd::Lost;
                }
                Frame::Received(None) => {
                    tracing::info!(gate_id = %self.gate_id, "Live channel closed");
                    return ChannelEnd::Lost;
                }
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match LiveMessage::parse(text) {
            Ok(LiveMessage::ZoneUpdate(zone)) => {
                self.audit.push_zone_update(&zone);
                let zone_id = zone.id.clone();
                let applied = self.store.upsert_by_id(zone);
                tracing::trace!(%zone_id, applied, "Zone update");
                self.shared
                    .emit(SessionEvent::ZoneUpdated { zone_id, applied });
            }
            Ok(LiveMessage::AdminUpdate(entry)) => {
                tracing::info!(
                    admin_id = %entry.admin_id,
                    action = %entry.action,
                    target = %entry.target_id,
                    "Admin update"
                );
                self.audit.push(entry.clone());
                self.shared.emit(SessionEvent::AdminUpdate(entry));
            }
            Ok(LiveMessage::Subscribe(payload)) => {
                tracing::warn!(gate_id = %payload.gate_id, "Unexpected subscribe frame from server");
            }
            Err(e) => {
                let err = ClientError::from(e);
                tracing::warn!(gate_id = %self.gate_id, "{err}");
                self.shared.emit(SessionEvent::ProtocolError(err.to_string()));
            }
        }
    }
}
