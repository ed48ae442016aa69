//! Provider credential bundle.
//!
//! # Security
//! - Credentials are loaded ONLY from environment variables
//! - `Debug` output is redacted; values are never logged in full

use std::fmt;

use crate::config::loader::ConfigError;

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "MASCHAIN_API_KEY";
/// Environment variable holding the API secret.
pub const API_SECRET_ENV_VAR: &str = "MASCHAIN_API_SECRET";
/// Environment variable holding the project identifier.
pub const PROJECT_ID_ENV_VAR: &str = "MASCHAIN_PROJECT_ID";

/// API key, secret and project id attached to every provider request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    project_id: String,
}

impl Credentials {
    /// Build a bundle, failing if any part is empty.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let (api_key, api_secret, project_id) = (api_key.into(), api_secret.into(), project_id.into());

        let missing: Vec<&'static str> = [
            (API_KEY_ENV_VAR, &api_key),
            (API_SECRET_ENV_VAR, &api_secret),
            (PROJECT_ID_ENV_VAR, &project_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }

        Ok(Self {
            api_key,
            api_secret,
            project_id,
        })
    }

    /// Load credentials through a variable lookup.
    ///
    /// Every missing variable is reported in the same error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(
            lookup(API_KEY_ENV_VAR).unwrap_or_default(),
            lookup(API_SECRET_ENV_VAR).unwrap_or_default(),
            lookup(PROJECT_ID_ENV_VAR).unwrap_or_default(),
        )
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

/// Keep at most the first four characters of a secret.
fn redact(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{visible}***")
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &"***")
            .field("project_id", &self.project_id)
            .finish()
    }
}
