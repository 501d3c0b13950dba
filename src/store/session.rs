use std::sync::Arc;

use crate::error::StoreError;
use crate::models::profile::Profile;
use crate::models::session::SessionToken;
use crate::store::cookie::{self, AUTH_COOKIE, CookieBackend};
use crate::store::local::LocalStorage;

/// Local storage key holding the serialized profile.
pub const PROFILE_KEY: &str = "user";

/// Client-side storage for the session token and the user profile.
///
/// The two records have independent lifetimes. `write_profile` takes a
/// [`Profile`], which has no credential field, so no credential can reach
/// the profile storage.
pub trait SessionStore: Send + Sync {
    fn write_token(&self, token: &SessionToken) -> Result<(), StoreError>;

    /// Returns the stored token, or `None` when missing or unreadable.
    fn read_token(&self) -> Option<SessionToken>;

    fn clear_token(&self) -> Result<(), StoreError>;

    fn write_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Reads the stored profile, surfacing storage and parse failures.
    fn load_profile(&self) -> Result<Option<Profile>, StoreError>;

    fn clear_profile(&self) -> Result<(), StoreError>;

    /// Reads the stored profile; failures read as no profile.
    fn read_profile(&self) -> Option<Profile> {
        match self.load_profile() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("⚠️  Ignoring unreadable stored profile: {}", e);
                None
            }
        }
    }

    /// Clears both records, attempting the second even if the first fails.
    fn clear(&self) -> Result<(), StoreError> {
        let token = self.clear_token();
        let profile = self.clear_profile();
        token.and(profile)
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn write_token(&self, token: &SessionToken) -> Result<(), StoreError> {
        (**self).write_token(token)
    }

    fn read_token(&self) -> Option<SessionToken> {
        (**self).read_token()
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        (**self).clear_token()
    }

    fn write_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        (**self).write_profile(profile)
    }

    fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        (**self).load_profile()
    }

    fn clear_profile(&self) -> Result<(), StoreError> {
        (**self).clear_profile()
    }
}

/// A device's session storage: the `auth` cookie plus the `user` entry in
/// local storage.
pub struct DeviceSessionStore<C, L> {
    cookies: C,
    storage: L,
    secure_cookies: bool,
}

impl<C: CookieBackend, L: LocalStorage> DeviceSessionStore<C, L> {
    /// Creates a new `DeviceSessionStore`.
    ///
    /// # Arguments
    ///
    /// * `cookies` - Where the `auth` cookie is kept.
    /// * `storage` - Where the profile is kept.
    /// * `secure_cookies` - Whether cookies require a secure transport.
    pub fn new(cookies: C, storage: L, secure_cookies: bool) -> Self {
        Self {
            cookies,
            storage,
            secure_cookies,
        }
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn storage(&self) -> &L {
        &self.storage
    }
}

impl<C: CookieBackend, L: LocalStorage> SessionStore for DeviceSessionStore<C, L> {
    fn write_token(&self, token: &SessionToken) -> Result<(), StoreError> {
        let cookie = cookie::create_auth_cookie(token.as_str().to_string(), self.secure_cookies);
        self.cookies.add(cookie)?;
        tracing::debug!("🍪 Session cookie written");
        Ok(())
    }

    fn read_token(&self) -> Option<SessionToken> {
        match self.cookies.get(AUTH_COOKIE) {
            Ok(cookie) => cookie
                .filter(|c| !c.value().is_empty())
                .map(|c| SessionToken::new(c.value().to_string())),
            Err(e) => {
                tracing::warn!("⚠️  Failed to read session cookie: {}", e);
                None
            }
        }
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        self.cookies.remove(cookie::removal_cookie(AUTH_COOKIE))
    }

    fn write_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let json = sonic_rs::to_string(profile)?;
        self.storage.set_item(PROFILE_KEY, &json)
    }

    fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        match self.storage.get_item(PROFILE_KEY)? {
            Some(raw) => Ok(Some(sonic_rs::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn clear_profile(&self) -> Result<(), StoreError> {
        self.storage.remove_item(PROFILE_KEY)
    }
}
