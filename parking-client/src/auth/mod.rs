//! Operator login, token persistence and page guarding

pub mod guard;
pub mod token;

pub use guard::{RouteDecision, RouteGuard};
pub use token::{StoredToken, TokenStore};

use shared::models::UserRole;
use validator::Validate;

use crate::{ClientError, ClientResult, HttpClient};

/// Login credentials, checked before anything is sent
#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(length(min = 2, message = "Username must be at least 2 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Page an operator lands on after login
pub fn landing_path(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "/admin",
        UserRole::Employee => "/checkpoint",
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: StoredToken,
    pub landing: &'static str,
}

/// Log in, persist the token when a store is given, and pick the landing page.
///
/// Roles this client does not know are rejected and nothing is saved.
pub async fn login(
    client: &HttpClient,
    tokens: Option<&TokenStore>,
    username: &str,
    password: &str,
) -> ClientResult<LoginOutcome> {
    let response = client.login(username, password).await?;
    let Some(role) = response.user.role() else {
        tracing::warn!(username, role = %response.user.role, "Login returned unknown role");
        return Err(ClientError::Invalid("Unknown user role".to_string()));
    };

    let username = response.user.username.or_else(|| Some(username.to_string()));
    let token = StoredToken::new(response.token, role, username);
    if let Some(tokens) = tokens {
        tokens.save(&token)?;
    }
    tracing::info!(%role, "Logged in");

    Ok(LoginOutcome {
        token,
        landing: landing_path(role),
    })
}

/// Client carrying the saved token, if any
pub fn restore(client: HttpClient, tokens: &TokenStore) -> HttpClient {
    match tokens.load() {
        Some(saved) => client.with_token(saved.token),
        None => client,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;

    #[test]
    fn test_landing_path_by_role() {
        assert_eq!(landing_path(UserRole::Admin), "/admin");
        assert_eq!(landing_path(UserRole::Employee), "/checkpoint");
    }

    #[test]
    fn test_login_form_rules() {
        assert!(LoginForm::new("ab", "x").validate().is_ok());
        assert!(LoginForm::new("a", "secret").validate().is_err());
        assert!(LoginForm::new("admin", "").validate().is_err());
    }

    #[tokio::test]
    async fn test_invalid_login_is_not_sent() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path());
        // Nothing listens here: reaching the network would surface as Http
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9/api/v1")).unwrap();

        let err = login(&client, Some(&tokens), "a", "secret").await.unwrap_err();
        assert!(matches!(
            &err,
            ClientError::Invalid(message) if message == "Username must be at least 2 characters"
        ));

        let err = login(&client, Some(&tokens), "a", "").await.unwrap_err();
        let message = match err {
            ClientError::Invalid(message) => message,
            other => panic!("expected Invalid, got {other:?}"),
        };
        assert!(message.contains("Password is required"));
        assert!(message.contains("Username must be at least 2 characters"));
        assert!(!tokens.exists());
    }

    #[test]
    fn test_restore_uses_saved_token() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path());
        let client = HttpClient::new(&ClientConfig::default()).unwrap();

        let client = restore(client, &tokens);
        assert!(client.token().is_none());

        tokens
            .save(&StoredToken::new("jwt-1", UserRole::Employee, None))
            .unwrap();
        let client = restore(client, &tokens);
        assert_eq!(client.token(), Some("jwt-1"));
    }
}
