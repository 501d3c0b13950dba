use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::models::response::AuthFailure;

/// The subsystem's error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The login input was rejected before reaching the backend.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend could not be reached or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered the login with a non-success status.
    #[error("Login rejected with status {0}")]
    Rejected(StatusCode),

    /// The backend answered with a body that is not a login response.
    #[error("Malformed login response: {0}")]
    MalformedResponse(String),

    /// A session token error.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// A session storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// A `Result` type that uses `AuthError` as the error type.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Logs the cause and collapses it into the uniform login failure.
    ///
    /// The caller never learns whether the network, the backend or local
    /// storage was at fault.
    pub fn into_login_failure(self) -> AuthFailure {
        match self {
            AuthError::Validation(ref msg) => {
                tracing::debug!("Login input rejected: {}", msg);
            }

            AuthError::Transport(ref e) => {
                tracing::warn!("Login request failed: {}", e);
            }

            AuthError::Rejected(status) => {
                tracing::warn!("Login rejected by backend: {}", status);
            }

            AuthError::MalformedResponse(ref msg) => {
                tracing::error!("Malformed login response: {}", msg);
            }

            AuthError::Token(ref e) => {
                tracing::error!("Failed to sign session token: {}", e);
            }

            AuthError::Storage(ref e) => {
                tracing::error!("Failed to persist session: {}", e);
            }
        }

        AuthFailure::login_error()
    }
}

/// Failures of the session token codec.
///
/// Callers treat every variant the same way: the session is not usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Failures of the client-side session storage.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] sonic_rs::Error),

    /// A backing file as a whole is unreadable.
    #[error("Corrupt store file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: sonic_rs::Error,
    },

    #[error("Cookie parse error: {0}")]
    Cookie(#[from] tower_cookies::cookie::ParseError),
}

/// A profile whose role record does not match its profile type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("profile type {profile_type} cannot carry a {record} record")]
pub struct ProfileError {
    pub profile_type: &'static str,
    pub record: &'static str,
}

/// A failed data request, as seen by the session layer.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status: status.map(|s| s.as_u16()),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.and_then(|s| StatusCode::from_u16(s).ok())
    }

    /// Whether the backend refused the request for lack of a valid session.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
