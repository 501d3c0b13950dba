use garde::Validate;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AuthError, Result};

/// The request payload sent to the backend login endpoint.
#[derive(Serialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Validates a login request before it leaves the device.
///
/// # Arguments
///
/// * `request` - The request to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the request may be sent.
pub fn validate_login(request: &LoginRequest) -> Result<()> {
    if request.username.trim().is_empty() {
        return Err(AuthError::Validation(
            "Username cannot be blank".to_string(),
        ));
    }

    request
        .validate()
        .map_err(|report| AuthError::Validation(report.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_credentials() {
        assert!(validate_login(&LoginRequest::new("bob", "secret")).is_ok());
    }

    #[test]
    fn rejects_empty_or_blank_fields() {
        assert!(validate_login(&LoginRequest::new("", "secret")).is_err());
        assert!(validate_login(&LoginRequest::new("   ", "secret")).is_err());
        assert!(validate_login(&LoginRequest::new("bob", "")).is_err());
    }

    #[test]
    fn rejects_oversized_password() {
        let password = "x".repeat(129);
        assert!(matches!(
            validate_login(&LoginRequest::new("bob", &password)),
            Err(AuthError::Validation(_))
        ));
    }
}
