use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::Mutex;
use tower_cookies::cookie::time::{Duration, OffsetDateTime};
use tower_cookies::cookie::{CookieJar, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::error::StoreError;

/// Name of the cookie holding the signed session token.
pub const AUTH_COOKIE: &str = "auth";
/// Lifetime of the `auth` cookie in days.
///
/// Longer than the token's own one-day validity; verification decides
/// whether the token is still usable.
pub const COOKIE_LIFETIME_DAYS: i64 = 30;

/// Creates the cookie that carries the session token.
///
/// # Arguments
///
/// * `value` - The signed session token.
/// * `secure` - Whether to require a secure transport (production).
///
/// # Returns
///
/// A site-wide, strict same-site cookie that lives for thirty days.
pub fn create_auth_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, value);

    if secure {
        cookie.set_secure(true);
    }

    cookie.set_same_site(SameSite::Strict);
    let lifetime = Duration::days(COOKIE_LIFETIME_DAYS);
    cookie.set_max_age(lifetime);
    cookie.set_expires(OffsetDateTime::now_utc() + lifetime);
    cookie.set_path("/");

    cookie
}

/// Creates a cookie that removes `name` at the site root.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookie
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc())
}

/// Somewhere cookies live between requests.
pub trait CookieBackend: Send + Sync {
    /// Returns the live cookie called `name`, if any.
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, StoreError>;

    fn add(&self, cookie: Cookie<'static>) -> Result<(), StoreError>;

    fn remove(&self, cookie: Cookie<'static>) -> Result<(), StoreError>;
}

/// The request-scoped jar of an axum handler behind `CookieManagerLayer`.
impl CookieBackend for Cookies {
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, StoreError> {
        Ok(Cookies::get(self, name).map(Cookie::into_owned))
    }

    fn add(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        Cookies::add(self, cookie);
        Ok(())
    }

    fn remove(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        Cookies::remove(self, cookie);
        Ok(())
    }
}

/// An in-process cookie jar.
#[derive(Default)]
pub struct MemoryCookies {
    jar: Mutex<CookieJar>,
}

impl MemoryCookies {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieBackend for MemoryCookies {
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, StoreError> {
        let jar = self.jar.lock();
        Ok(jar
            .get(name)
            .filter(|cookie| !is_expired(cookie))
            .cloned())
    }

    fn add(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        self.jar.lock().add(cookie);
        Ok(())
    }

    fn remove(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        self.jar.lock().remove(cookie);
        Ok(())
    }
}

/// A cookie jar persisted to disk, one `Set-Cookie` line per cookie.
pub struct FileCookies {
    path: PathBuf,
}

impl FileCookies {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<Cookie<'static>>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut cookies = Vec::new();
        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            match Cookie::parse(line.to_owned()) {
                Ok(cookie) => cookies.push(cookie),
                Err(e) => {
                    tracing::warn!(
                        "⚠️  Skipping unreadable cookie line in {}: {}",
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(cookies)
    }

    fn save(&self, cookies: &[Cookie<'static>]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut contents = String::new();
        for cookie in cookies {
            contents.push_str(&cookie.to_string());
            contents.push('\n');
        }

        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl CookieBackend for FileCookies {
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|cookie| cookie.name() == name && !is_expired(cookie)))
    }

    fn add(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        let mut cookies = self.load()?;
        cookies.retain(|c| c.name() != cookie.name() || c.path() != cookie.path());
        cookies.push(cookie);
        self.save(&cookies)
    }

    fn remove(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        let mut cookies = self.load()?;
        let before = cookies.len();
        cookies.retain(|c| c.name() != cookie.name() || c.path() != cookie.path());

        if cookies.len() != before {
            tracing::debug!("🍪 Removed cookie {} from {}", cookie.name(), self.path.display());
        }

        self.save(&cookies)
    }
}
