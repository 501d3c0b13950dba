use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// Runtime mode; gates the `Secure` attribute of the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            AppEnv::Production
        } else {
            AppEnv::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == AppEnv::Production
    }
}

/// The session subsystem's configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the backend API.
    pub api_url: String,
    /// The shared secret used to sign session tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// The runtime mode.
    pub app_env: AppEnv,
    /// Directory holding the cookie jar and local storage files.
    pub state_dir: PathBuf,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut secret = lookup("NEXT_PUBLIC_JWT_SECRET")
            .context("NEXT_PUBLIC_JWT_SECRET must be set")?;

        if secret.is_empty() {
            anyhow::bail!("NEXT_PUBLIC_JWT_SECRET must not be empty");
        }

        let jwt_secret = Zeroizing::new(secret.as_bytes().to_vec());
        secret.zeroize();

        let api_url = lookup("API_URL").context("API_URL must be set")?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!("API_URL must be an http(s) URL, got {}", api_url);
        }

        Ok(Self {
            api_url,
            jwt_secret,
            app_env: AppEnv::parse(
                &lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            ),
            state_dir: lookup("DASHBOARD_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".dashboard")),
        })
    }

    /// Path of the persisted cookie jar.
    pub fn cookie_jar_path(&self) -> PathBuf {
        self.state_dir.join("cookies.txt")
    }

    /// Path of the persisted local storage.
    pub fn local_storage_path(&self) -> PathBuf {
        self.state_dir.join("local_storage.json")
    }
}
