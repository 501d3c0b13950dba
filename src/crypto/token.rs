use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::error::TokenError;
use crate::models::session::{Credential, SessionToken, TokenClaims};

/// Lifetime of a session token in seconds (one day).
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Signs a credential into a session token issued now.
pub fn sign(credential: &Credential, secret: &[u8]) -> Result<SessionToken, TokenError> {
    sign_at(credential, secret, Utc::now())
}

/// Signs a credential into a session token issued at `issued_at`.
///
/// # Arguments
///
/// * `credential` - The backend credential to wrap.
/// * `secret` - The shared HMAC secret.
/// * `issued_at` - The issuance time; the token expires one day later.
///
/// # Returns
///
/// A `Result` containing the signed token. Identical inputs give identical
/// tokens.
pub fn sign_at(
    credential: &Credential,
    secret: &[u8],
    issued_at: DateTime<Utc>,
) -> Result<SessionToken, TokenError> {
    let iat = issued_at.timestamp();
    let claims = TokenClaims {
        credential: credential.expose().to_string(),
        iat,
        exp: iat + TOKEN_LIFETIME_SECS,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok(SessionToken::new(token))
}

/// Verifies a session token's signature and expiration.
///
/// Never panics: a foreign secret, an expired token and garbage input all
/// come back as `Err`.
pub fn verify(token: &SessionToken, secret: &[u8]) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<TokenClaims>(
        token.as_str(),
        &DecodingKey::from_secret(secret),
        &validation,
    )?;

    Ok(data.claims)
}
