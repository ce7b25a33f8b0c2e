//! Client configuration

use std::time::Duration;

/// Default REST base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";
/// Default live channel endpoint
pub const DEFAULT_WS_URL: &str = "ws://localhost:3000/api/v1/ws";
/// Delay before a dropped gate session is restarted
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Client configuration for connecting to the parking API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL (e.g., "http://localhost:3000/api/v1")
    pub base_url: String,

    /// Live channel URL (e.g., "ws://localhost:3000/api/v1/ws")
    pub ws_url: String,

    /// Bearer token for admin endpoints
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Fixed delay between gate session restarts
    pub reconnect_delay: Duration,

    /// Audit log capacity (newest entries kept)
    pub audit_capacity: usize,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let ws_url = derive_ws_url(&base_url);
        Self {
            base_url,
            ws_url,
            token: None,
            timeout: 30,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            audit_capacity: crate::audit::DEFAULT_CAPACITY,
        }
    }

    /// Load configuration from the environment (and `.env` if present)
    ///
    /// - `PARKING_API_URL`
    /// - `PARKING_WS_URL` (defaults to the API URL with a ws scheme + `/ws`)
    /// - `PARKING_TOKEN`
    /// - `PARKING_TIMEOUT_SECS`
    /// - `PARKING_RECONNECT_DELAY_MS`
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();

        let mut config =
            Self::new(std::env::var("PARKING_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()));
        if let Ok(ws_url) = std::env::var("PARKING_WS_URL") {
            config.ws_url = ws_url;
        }
        config.token = std::env::var("PARKING_TOKEN").ok().filter(|t| !t.is_empty());
        config.timeout = std::env::var("PARKING_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        config.reconnect_delay = std::env::var("PARKING_RECONNECT_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RECONNECT_DELAY);
        config
    }

    /// Set the live channel URL
    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the delay between session restarts
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the audit log capacity
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// `http://host/api/v1` -> `ws://host/api/v1/ws`
fn derive_ws_url(base_url: &str) -> String {
    let ws = base_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1);
    format!("{}/ws", ws.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.ws_url, DEFAULT_WS_URL);
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("https://parking.example.com/api/v1/")
            .with_token("secret")
            .with_timeout(5)
            .with_reconnect_delay(Duration::from_millis(250));

        assert_eq!(config.ws_url, "wss://parking.example.com/api/v1/ws");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_explicit_ws_url_wins() {
        let config = ClientConfig::default().with_ws_url("ws://gate-box:9000/live");
        assert_eq!(config.ws_url, "ws://gate-box:9000/live");
    }
}
