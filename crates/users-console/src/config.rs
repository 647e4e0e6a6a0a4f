use std::env;

use users_shared::api::FUNCTION_PREFIX;

/// Local API address used by debug builds.
pub const DEV_API_URL: &str = "http://localhost:3000";

const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_SECURE_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com";

/// Identity values that must be present before the client starts.
pub const REQUIRED_VARS: [&str; 7] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
    "FIREBASE_MESSAGING_SENDER_ID",
    "FIREBASE_APP_ID",
    "FIREBASE_MEASUREMENT_ID",
];

/// Origin the relative API path is resolved against in release builds.
pub const SITE_URL_VAR: &str = "USERS_SITE_URL";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required environment variables: {}", .0.join(", "))]
pub struct MissingConfig(pub Vec<&'static str>);

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: String,
    pub identity_endpoint: String,
    pub secure_token_endpoint: String,
}

impl IdentityConfig {
    /// Loggable view of the identity settings. The API key is left out.
    pub fn summary(&self) -> String {
        format!(
            "project={} domain={} app={} bucket={} sender={} measurement={}",
            self.project_id,
            self.auth_domain,
            self.app_id,
            self.storage_bucket,
            self.messaging_sender_id,
            self.measurement_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub identity: IdentityConfig,
}

/// Base URL of the users API.
///
/// Debug builds talk to the local server; release builds use the function
/// prefix relative to the deployed site.
pub fn api_base_url(site_url: Option<&str>) -> String {
    if cfg!(debug_assertions) {
        format!("{DEV_API_URL}{FUNCTION_PREFIX}")
    } else {
        let site = site_url.unwrap_or_default().trim_end_matches('/');
        format!("{site}{FUNCTION_PREFIX}")
    }
}

fn required_vars() -> Vec<&'static str> {
    let mut vars = REQUIRED_VARS.to_vec();
    if !cfg!(debug_assertions) {
        vars.push(SITE_URL_VAR);
    }
    vars
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, MissingConfig> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Every missing name is reported at once, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MissingConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let missing: Vec<&'static str> = required_vars()
            .into_iter()
            .filter(|key| present(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(MissingConfig(missing));
        }

        let value = |key: &str| present(key).unwrap_or_default();

        Ok(Self {
            api_url: api_base_url(present(SITE_URL_VAR).as_deref()),
            identity: IdentityConfig {
                api_key: value("FIREBASE_API_KEY"),
                auth_domain: value("FIREBASE_AUTH_DOMAIN"),
                project_id: value("FIREBASE_PROJECT_ID"),
                storage_bucket: value("FIREBASE_STORAGE_BUCKET"),
                messaging_sender_id: value("FIREBASE_MESSAGING_SENDER_ID"),
                app_id: value("FIREBASE_APP_ID"),
                measurement_id: value("FIREBASE_MEASUREMENT_ID"),
                identity_endpoint: present("IDENTITY_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_IDENTITY_ENDPOINT.to_string()),
                secure_token_endpoint: present("SECURE_TOKEN_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SECURE_TOKEN_ENDPOINT.to_string()),
            },
        })
    }
}
