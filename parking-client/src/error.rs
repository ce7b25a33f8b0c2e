//! Client error types

use shared::ProtocolError;
use thiserror::Error;
use validator::ValidationErrors;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Gate, ticket or subscription does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Subscription exists but is not active
    #[error("Subscription is not active")]
    Inactive(String),

    /// Client-side validation failed; nothing was sent
    #[error("{0}")]
    Invalid(String),

    /// Non-2xx response; `message` is the server's text, shown verbatim
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Live channel closed or failed to open
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Live channel frame violated the protocol
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local I/O (token file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Message suitable for showing to the operator as-is
    pub fn operator_message(&self) -> String {
        match self {
            ClientError::NotFound(what) => format!("{what} not found"),
            other => other.to_string(),
        }
    }

    /// Transport-level failure (endpoint unreachable, link dropped)
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ClientError::ConnectionLost(_) | ClientError::Http(_))
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let message = fields
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => e.code.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        ClientError::Invalid(message)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_verbatim() {
        let err = ClientError::Server {
            status: 409,
            message: "Zone is full".into(),
        };
        assert_eq!(err.to_string(), "Zone is full");
        assert_eq!(err.operator_message(), "Zone is full");
    }

    #[test]
    fn test_not_found_operator_message() {
        let err = ClientError::NotFound("Ticket t_404".into());
        assert_eq!(err.operator_message(), "Ticket t_404 not found");
    }

    #[test]
    fn test_connection_errors() {
        assert!(ClientError::ConnectionLost("refused".into()).is_connection_error());
        assert!(!ClientError::NotFound("Gate gate_9".into()).is_connection_error());
        assert!(
            !ClientError::Server {
                status: 503,
                message: "Service unavailable".into(),
            }
            .is_connection_error()
        );
    }
}
