use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::models::profile::ProfileType;
use crate::models::response::CanResponse;
use crate::services::auth::AuthProvider;
use crate::services::data_provider::{DataProvider, RestDataProvider};
use crate::store::session::SessionStore;

/// How gated buttons behave when access is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonOptions {
    pub enable_access_control: bool,
    /// Hide denied buttons instead of showing them disabled.
    pub hide_if_unauthorized: bool,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            enable_access_control: true,
            hide_if_unauthorized: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessControlOptions {
    pub buttons: ButtonOptions,
}

/// Decides whether the current session may perform an action on a resource.
///
/// Resources without a rule are open to everyone. A resource with a rule is
/// open only to the profile type the rule names, whatever the action.
pub struct AccessControl<S, D = RestDataProvider> {
    auth: Arc<AuthProvider<S, D>>,
    rules: HashMap<String, ProfileType>,
    options: AccessControlOptions,
}

impl<S: SessionStore, D: DataProvider> AccessControl<S, D> {
    /// Creates the dashboard's access control: `users` is reserved for the
    /// top administrative level.
    pub fn new(auth: Arc<AuthProvider<S, D>>) -> Self {
        Self {
            auth,
            rules: HashMap::new(),
            options: AccessControlOptions::default(),
        }
        .with_rule("users", ProfileType::TOP_LEVEL)
    }

    pub fn with_rule(mut self, resource: impl Into<String>, required: ProfileType) -> Self {
        self.rules.insert(resource.into(), required);
        self
    }

    pub fn with_options(mut self, options: AccessControlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> AccessControlOptions {
        self.options
    }

    pub async fn can(&self, resource: &str, action: &str) -> CanResponse {
        let level = match self.auth.resolve_permissions().await {
            Ok(level) => level,
            Err(e) => {
                tracing::warn!("❌ Permission lookup failed for {}/{}: {}", resource, action, e);
                return CanResponse::denied("Unauthorized");
            }
        };

        match self.rules.get(resource) {
            None => CanResponse::allowed(),
            Some(required) if level == Some(*required) => CanResponse::allowed(),
            Some(required) => {
                tracing::debug!(
                    "Denied {} on {}: requires {}, have {:?}",
                    action,
                    resource,
                    required,
                    level
                );
                CanResponse::denied(format!("Only {} may access {}", required, resource))
            }
        }
    }
}
