//! Session and permission handling for the school records dashboard.
//!
//! Signs the backend-issued credential into a one-day session token, keeps
//! it in the `auth` cookie, keeps the user's profile in local storage, and
//! answers "may this user touch that resource" from the stored profile type.

pub mod config;
pub mod error;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod profile;
    pub mod response;
    pub mod session;
}

pub mod store {
    pub mod cookie;
    pub mod local;
    pub mod session;
}

pub mod services {
    pub mod access_control;
    pub mod auth;
    pub mod data_provider;
}

pub mod validation {
    pub mod auth;
}

pub use config::{AppEnv, Config};
pub use error::{AuthError, Result, StoreError, TokenError, TransportError};
pub use services::access_control::{AccessControl, AccessControlOptions, ButtonOptions};
pub use services::auth::AuthProvider;
pub use services::data_provider::{DataProvider, RestDataProvider};
pub use store::session::{DeviceSessionStore, SessionStore};
