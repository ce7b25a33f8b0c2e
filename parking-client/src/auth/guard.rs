//! Route guard for operator pages

/// Where unauthenticated visitors of protected pages are sent
pub const LOGIN_PATH: &str = "/login";

const PROTECTED_PREFIXES: [&str; 2] = ["/checkpoint", "/admin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides whether a page may be shown; token contents are not verified
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn is_protected(path: &str) -> bool {
        PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    }

    pub fn check(&self, path: &str, token: Option<&str>) -> RouteDecision {
        let has_token = token.is_some_and(|t| !t.is_empty());
        if Self::is_protected(path) && !has_token {
            tracing::debug!(path, "Redirecting to login");
            RouteDecision::Redirect(LOGIN_PATH)
        } else {
            RouteDecision::Allow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_paths_need_a_token() {
        let guard = RouteGuard;
        assert_eq!(guard.check("/checkpoint", None), RouteDecision::Redirect("/login"));
        assert_eq!(
            guard.check("/admin/parking-state", Some("")),
            RouteDecision::Redirect("/login")
        );
        assert_eq!(guard.check("/admin", Some("jwt")), RouteDecision::Allow);
    }

    #[test]
    fn test_public_paths_are_open() {
        let guard = RouteGuard;
        assert_eq!(guard.check("/", None), RouteDecision::Allow);
        assert_eq!(guard.check("/gate/gate_1", None), RouteDecision::Allow);
        assert_eq!(guard.check("/login", None), RouteDecision::Allow);
    }
}
