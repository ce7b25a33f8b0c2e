//! Gate monitor example
//!
//! Opens a live session for one gate and prints zone availability as updates
//! arrive. Configuration comes from the environment (`PARKING_API_URL`,
//! `PARKING_WS_URL`, ...).
//!
//! Run: cargo run --example gate_monitor -- gate_1

use parking_client::checkin::is_visitor_selectable;
use parking_client::{ClientConfig, GateSession, SessionEvent};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parking_client=info".into()),
        )
        .init();

    let gate_id = std::env::args().nth(1).unwrap_or_else(|| "gate_1".to_string());
    let config = ClientConfig::from_env();
    tracing::info!(gate_id = %gate_id, api = %config.base_url, ws = %config.ws_url, "Starting gate monitor");

    let session = GateSession::connect(&config, gate_id)?;
    let mut events = session.subscribe_events();
    session.open().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SessionEvent::StatusChanged(status)) => println!("[{status}]"),
                Ok(SessionEvent::GateLoaded(gate)) => println!("Gate: {} ({})", gate.name, gate.location),
                Ok(SessionEvent::ZonesReplaced(_)) | Ok(SessionEvent::ZoneUpdated { .. }) => {
                    for zone in session.store().snapshot() {
                        let marker = if is_visitor_selectable(&zone) { " " } else { "x" };
                        println!(
                            "  [{marker}] {:<16} visitors {:>3}  subscribers {:>3}  rate {}",
                            zone.name,
                            zone.available_for_visitors,
                            zone.available_for_subscribers,
                            zone.current_rate()
                        );
                    }
                }
                Ok(SessionEvent::AdminUpdate(entry)) => {
                    println!("Admin {}: {} {} {}", entry.admin_id, entry.action, entry.target_type, entry.target_id);
                }
                Ok(SessionEvent::ProtocolError(message)) => eprintln!("Protocol error: {message}"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    session.close().await;
    Ok(())
}
