//! Error kinds surfaced by a sync run.
//!
//! Every remote call returns these explicitly; the front-end renders whichever
//! one ends the run as the single failure message.
use thiserror::Error;

/// Code used when the HTTP exchange itself failed.
pub const TRANSPORT_CODE: &str = "transport";
/// Code used when the response body could not be decoded.
pub const DECODE_CODE: &str = "decode";

#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or missing input, raised before any remote call.
    #[error("{0}")]
    Config(String),

    /// A remote call failed; `code` is the provider's error code.
    #[error("FATAL: Code [{code}] - {message}")]
    RemoteApi { code: String, message: String },

    #[error(
        "ambiguous lookup: NodeBalancers {} all carry the label {label:?}; target one with node_balancer_id",
        format_ids(.ids)
    )]
    AmbiguousLookup { label: String, ids: Vec<u64> },

    #[error("NodeBalancer {id} was not found when re-read after {action}")]
    MissingAfterWrite { id: u64, action: &'static str },
}

pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config(message.into())
    }

    pub fn remote(code: impl ToString, message: impl Into<String>) -> Self {
        SyncError::RemoteApi {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Stable kind label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "config",
            SyncError::RemoteApi { .. } => "remote_api",
            SyncError::AmbiguousLookup { .. } => "ambiguous_lookup",
            SyncError::MissingAfterWrite { .. } => "missing_after_write",
        }
    }
}

fn format_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
