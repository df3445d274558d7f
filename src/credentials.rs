//! API key resolution.
//!
//! The key is resolved in priority order:
//! 1. `--api-key` flag (or `api_key` in the parameters file)
//! 2. `LINODE_API_KEY` environment variable
use crate::error::{SyncError, SyncResult};
use std::env;
use std::fmt;

pub const API_KEY_ENV: &str = "LINODE_API_KEY";

/// A Linode API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Resolve the API key from an explicit value or the process environment.
pub fn resolve_api_key(explicit: Option<&str>) -> SyncResult<ApiKey> {
    resolve_api_key_with(explicit, |name| env::var(name).ok())
}

pub(crate) fn resolve_api_key_with<F>(explicit: Option<&str>, lookup: F) -> SyncResult<ApiKey>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = explicit.map(str::trim).filter(|key| !key.is_empty()) {
        tracing::debug!(source = "parameter", "api key resolved");
        return Ok(ApiKey(key.to_string()));
    }
    match lookup(API_KEY_ENV) {
        Some(key) if !key.trim().is_empty() => {
            tracing::debug!(source = API_KEY_ENV, "api key resolved");
            Ok(ApiKey(key.trim().to_string()))
        }
        _ => Err(SyncError::config(format!(
            "no API key: pass api_key or set {API_KEY_ENV}"
        ))),
    }
}
