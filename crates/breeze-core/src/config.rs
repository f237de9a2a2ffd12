//! Client configuration for the remote todo service.
//!
//! The service exposes a single GraphQL endpoint; queries and mutations all
//! POST to the same URL. The endpoint is resolved from the environment with
//! a loopback development default.

use crate::error::{Error, Result};

/// Environment variable naming the GraphQL endpoint.
pub const ENV_GRAPHQL_URL: &str = "BREEZE_GRAPHQL_URL";

/// Development default; the todo service listens on port 4000 locally.
pub const DEFAULT_GRAPHQL_URL: &str = "http://127.0.0.1:4000";

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    endpoint: String,
}

impl ApiConfig {
    /// Build a config from an explicit endpoint URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
        })
    }

    /// Resolve from `BREEZE_GRAPHQL_URL`, falling back to the dev default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The normalized GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(ENV_GRAPHQL_URL).filter(|value| !value.trim().is_empty()) {
            Some(url) => Self::new(&url),
            None => Self::new(DEFAULT_GRAPHQL_URL),
        }
    }
}

/// Validate and normalize an endpoint URL (trimmed, no trailing slash).
fn normalize_endpoint(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Validation(
            "GraphQL endpoint must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(Error::Validation(format!(
            "GraphQL endpoint must start with http:// or https://, got '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}
