//! Remote operations derived by [`plan`](super::plan).
use crate::api::{CreateRequest, UpdateRequest};
use serde::Serialize;
use std::fmt;

/// One write against the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Create(CreateRequest),
    Update(UpdateRequest),
    Delete { id: u64 },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Create(_) => "create",
            Action::Update(_) => "update",
            Action::Delete { .. } => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create(request) => write!(
                f,
                "create in datacenter {} ({} month term)",
                request.datacenter_id, request.payment_term
            ),
            Action::Update(request) => match &request.label {
                Some(label) => write!(
                    f,
                    "update {}: label {label:?}, throttle {}",
                    request.id, request.client_conn_throttle
                ),
                None => write!(
                    f,
                    "update {}: throttle {}",
                    request.id, request.client_conn_throttle
                ),
            },
            Action::Delete { id } => write!(f, "delete {id}"),
        }
    }
}
