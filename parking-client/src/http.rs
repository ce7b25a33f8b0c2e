//! HTTP client for the parking REST API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::client::{
    ApiErrorBody, CheckinRequest, CheckinResponse, CheckoutRequest, LoginRequest, LoginResponse,
};
use shared::models::{CheckoutResult, Gate, Subscription, Ticket, Zone};
use validator::Validate;

use crate::api::ParkingApi;
use crate::auth::LoginForm;
use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making requests to the parking API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Bearer token for admin endpoints; fails before any request is sent
    pub(crate) fn require_token(&self) -> ClientResult<&str> {
        self.token.as_deref().ok_or(ClientError::Unauthorized)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorized(self.client.get(self.url(path)));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorized(self.client.post(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorized(self.client.put(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            let message = error_message(&text, status);
            tracing::debug!(status = status.as_u16(), %message, "API request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
                StatusCode::NOT_FOUND => ClientError::NotFound(message),
                _ => ClientError::Server {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response.json().await.map_err(Into::into)
    }

    // ========== Auth API ==========

    /// Login with username and password
    ///
    /// Credentials failing [`LoginForm`] rules are rejected without a request.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        LoginForm::new(username, password).validate()?;
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        self.post::<LoginResponse, _>("auth/login", &request)
            .await
            .map_err(|e| match e {
                ClientError::Http(_) => e,
                _ => ClientError::Invalid("Invalid username or password".to_string()),
            })
    }

    // ========== Master data ==========

    /// All gates
    pub async fn list_gates(&self) -> ClientResult<Vec<Gate>> {
        self.get("master/gates").await
    }
}

/// Server message from an error body: `{"message": ...}` when present,
/// the raw body otherwise, the status reason when the body is empty.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl ParkingApi for HttpClient {
    async fn get_gate(&self, gate_id: &str) -> ClientResult<Gate> {
        // The API has no single-gate endpoint; filter the list client-side
        self.list_gates()
            .await?
            .into_iter()
            .find(|g| g.id == gate_id)
            .ok_or_else(|| ClientError::NotFound(format!("Gate {gate_id}")))
    }

    async fn list_zones(&self, gate_id: &str) -> ClientResult<Vec<Zone>> {
        let url = self.url("master/zones");
        let request = self
            .authorized(self.client.get(url))
            .query(&[("gateId", gate_id)]);
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn check_in(&self, request: &CheckinRequest) -> ClientResult<CheckinResponse> {
        self.post("tickets/checkin", request).await
    }

    async fn get_subscription(&self, subscription_id: &str) -> ClientResult<Subscription> {
        self.get(&format!("subscriptions/{subscription_id}")).await
    }

    async fn get_ticket(&self, ticket_id: &str) -> ClientResult<Ticket> {
        self.get(&format!("tickets/{ticket_id}")).await
    }

    async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<CheckoutResult> {
        self.post("tickets/checkout", request).await
    }
}
