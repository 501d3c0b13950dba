/// The data-access layer the session subsystem depends on.
pub trait DataProvider: Send + Sync {
    /// Base URL of the backend REST API, without a trailing slash.
    fn api_url(&self) -> &str;
}

/// The REST backend the dashboard talks to.
#[derive(Debug, Clone)]
pub struct RestDataProvider {
    api_url: String,
}

impl RestDataProvider {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

impl DataProvider for RestDataProvider {
    fn api_url(&self) -> &str {
        &self.api_url
    }
}
