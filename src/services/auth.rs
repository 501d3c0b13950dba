use serde::Deserialize;
use zeroize::Zeroizing;

use crate::crypto::token;
use crate::error::{AuthError, Result, StoreError, TransportError};
use crate::models::profile::{Identity, Profile, ProfileRecord, ProfileType};
use crate::models::response::{
    AuthActionResponse, AuthFailure, CheckResponse, DASHBOARD_ROUTE, LOGIN_ROUTE, OnErrorResponse,
};
use crate::models::session::Credential;
use crate::services::data_provider::{DataProvider, RestDataProvider};
use crate::store::session::SessionStore;
use crate::validation::auth::{LoginRequest, validate_login};

/// The credential envelope inside a login response.
#[derive(Deserialize)]
struct IssuedToken {
    token: String,
}

/// A successful login response: the credential plus the profile fields.
#[derive(Deserialize)]
struct LoginResponse {
    token: IssuedToken,
    #[serde(flatten)]
    profile: ProfileRecord,
}

/// The authenticated-session state machine.
///
/// Holds no session state of its own; every operation reads or writes the
/// injected [`SessionStore`].
pub struct AuthProvider<S, D = RestDataProvider> {
    store: S,
    data: D,
    http: reqwest::Client,
    secret: Zeroizing<Vec<u8>>,
}

impl<S: SessionStore, D: DataProvider> AuthProvider<S, D> {
    /// Creates a new `AuthProvider`.
    ///
    /// # Arguments
    ///
    /// * `store` - The device's session storage.
    /// * `data` - The data-access layer supplying the backend URL.
    /// * `secret` - The shared token signing secret.
    pub fn new(store: S, data: D, secret: &[u8]) -> Self {
        Self {
            store,
            data,
            http: reqwest::Client::new(),
            secret: Zeroizing::new(secret.to_vec()),
        }
    }

    /// Replaces the HTTP client used for the login request.
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exchanges credentials for a session.
    ///
    /// Every failure, whatever its cause, is reported as the same
    /// `LoginError`. Nothing is stored unless the backend accepts the login.
    pub async fn login(&self, username: &str, password: &str) -> AuthActionResponse {
        tracing::info!("🔐 Login attempt for: {}", username);

        match self.try_login(username, password).await {
            Ok(profile) => {
                tracing::info!(
                    "✅ User logged in: {} ({})",
                    profile.username,
                    profile.profile_type()
                );
                AuthActionResponse::success(DASHBOARD_ROUTE)
            }
            Err(e) => AuthActionResponse::failure(e.into_login_failure()),
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<Profile> {
        let request = LoginRequest::new(username, password);
        validate_login(&request)?;

        let url = format!("{}/login", self.data.api_url());
        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected(status));
        }

        let body = response.text().await?;
        let LoginResponse { token: issued, profile } = sonic_rs::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        let profile =
            Profile::try_from(profile).map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        let credential = Credential::new(issued.token);
        let session_token = token::sign(&credential, &self.secret)?;

        self.store.write_token(&session_token)?;
        tracing::debug!("🔑 Session token stored");

        if let Err(e) = self.store.write_profile(&profile) {
            if let Err(rollback) = self.store.clear_token() {
                tracing::error!("❌ Failed to roll back session cookie: {}", rollback);
            }
            return Err(e.into());
        }

        Ok(profile)
    }

    /// Clears the session. Always succeeds.
    pub async fn logout(&self) -> AuthActionResponse {
        if let Err(e) = self.store.clear_token() {
            tracing::error!("❌ Failed to clear session cookie: {}", e);
        }

        if let Err(e) = self.store.clear_profile() {
            tracing::error!("❌ Failed to clear stored profile: {}", e);
        }

        tracing::info!("👋 Session cleared");
        AuthActionResponse::success(LOGIN_ROUTE)
    }

    /// Reports whether the stored token is still a valid session.
    ///
    /// An unauthenticated result asks the caller to log out; this method does
    /// not clear storage itself.
    pub async fn check(&self) -> CheckResponse {
        let Some(session_token) = self.store.read_token() else {
            tracing::debug!("No session cookie found");
            return CheckResponse::unauthenticated(None);
        };

        match token::verify(&session_token, &self.secret) {
            Ok(_) => {
                tracing::debug!("✅ Session token verified");
                CheckResponse::authenticated()
            }
            Err(e) => {
                tracing::warn!("❌ Session token rejected: {}", e);
                CheckResponse::unauthenticated(Some(AuthFailure::unauthorized(e.to_string())))
            }
        }
    }

    /// Resolves the permission level, surfacing storage faults.
    ///
    /// An unparsable profile entry is not a fault: it resolves to no level,
    /// the same as no profile at all. An unreadable or corrupt storage file
    /// is.
    pub async fn resolve_permissions(&self) -> Result<Option<ProfileType>> {
        match self.store.load_profile() {
            Ok(profile) => Ok(profile.map(|p| p.profile_type())),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!("⚠️  Ignoring unparsable stored profile: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the permission level, or `None` without a readable profile.
    pub async fn get_permissions(&self) -> Option<ProfileType> {
        self.store.read_profile().map(|p| p.profile_type())
    }

    /// Returns the current identity, or `None` without a readable profile.
    pub async fn get_identity(&self) -> Option<Identity> {
        self.store.read_profile().map(Identity::from)
    }

    /// Classifies a failed data request.
    pub async fn on_error(&self, error: TransportError) -> OnErrorResponse {
        if error.is_unauthorized() {
            tracing::warn!("Backend refused the session, forcing logout");
            OnErrorResponse::logout()
        } else {
            OnErrorResponse::pass_through(error)
        }
    }
}
