use serde::Serialize;

use crate::error::TransportError;

/// Where the dashboard lands after a successful login.
pub const DASHBOARD_ROUTE: &str = "/dashboard";
/// Where the dashboard sends users without a session.
pub const LOGIN_ROUTE: &str = "/login";

/// A user-facing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthFailure {
    pub name: String,
    pub message: String,
}

impl AuthFailure {
    /// The single failure reported for every unsuccessful login.
    pub fn login_error() -> Self {
        Self {
            name: "LoginError".to_string(),
            message: "Invalid username or password".to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            name: "Unauthorized".to_string(),
            message: message.into(),
        }
    }
}

/// Result of `login` and `logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AuthFailure>,
}

impl AuthActionResponse {
    pub fn success(redirect_to: &str) -> Self {
        Self {
            success: true,
            redirect_to: Some(redirect_to.to_string()),
            error: None,
        }
    }

    pub fn failure(error: AuthFailure) -> Self {
        Self {
            success: false,
            redirect_to: None,
            error: Some(error),
        }
    }
}

/// Result of `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub authenticated: bool,
    /// Asks the caller to run `logout` to clear stale storage.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub logout: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AuthFailure>,
}

impl CheckResponse {
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            logout: false,
            redirect_to: None,
            error: None,
        }
    }

    pub fn unauthenticated(error: Option<AuthFailure>) -> Self {
        Self {
            authenticated: false,
            logout: true,
            redirect_to: Some(LOGIN_ROUTE.to_string()),
            error,
        }
    }
}

/// Result of `on_error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnErrorResponse {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub logout: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TransportError>,
}

impl OnErrorResponse {
    pub fn logout() -> Self {
        Self {
            logout: true,
            error: None,
        }
    }

    pub fn pass_through(error: TransportError) -> Self {
        Self {
            logout: false,
            error: Some(error),
        }
    }
}

/// Result of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanResponse {
    pub can: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CanResponse {
    pub fn allowed() -> Self {
        Self {
            can: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            can: false,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn serializes_like_the_dashboard_expects() {
        let json = sonic_rs::to_string(&AuthActionResponse::success(DASHBOARD_ROUTE)).unwrap();
        assert_eq!(json, r#"{"success":true,"redirectTo":"/dashboard"}"#);

        let json = sonic_rs::to_string(&AuthActionResponse::failure(AuthFailure::login_error()))
            .unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"error":{"name":"LoginError","message":"Invalid username or password"}}"#
        );

        let json = sonic_rs::to_string(&CheckResponse::unauthenticated(None)).unwrap();
        assert_eq!(
            json,
            r#"{"authenticated":false,"logout":true,"redirectTo":"/login"}"#
        );

        let json = sonic_rs::to_string(&OnErrorResponse::logout()).unwrap();
        assert_eq!(json, r#"{"logout":true}"#);

        let err = TransportError::new(Some(StatusCode::INTERNAL_SERVER_ERROR), "boom");
        let json = sonic_rs::to_string(&OnErrorResponse::pass_through(err)).unwrap();
        assert_eq!(json, r#"{"error":{"status":500,"message":"boom"}}"#);
    }
}
