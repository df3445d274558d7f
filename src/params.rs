//! Invocation parameters before validation.
//!
//! Parameters arrive from an optional JSON file and from CLI flags. Both use
//! the same option names; flags win over file values.
use crate::desired::{AmbiguityPolicy, DesiredState};
use crate::error::{SyncError, SyncResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Raw, unvalidated options. Every field is optional so layers can overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    #[serde(alias = "linode_api_id")]
    pub api_key: Option<String>,
    pub name: Option<String>,
    pub node_balancer_id: Option<u64>,
    pub state: Option<DesiredState>,
    pub datacenter_id: Option<u32>,
    #[serde(alias = "paymentterm")]
    pub payment_term: Option<u32>,
    pub client_conn_throttle: Option<u32>,
    pub on_ambiguous: Option<AmbiguityPolicy>,
}

impl Params {
    /// Layer `over` on top of `self`; any value set in `over` wins.
    pub fn overlay(self, over: Params) -> Params {
        Params {
            api_key: over.api_key.or(self.api_key),
            name: over.name.or(self.name),
            node_balancer_id: over.node_balancer_id.or(self.node_balancer_id),
            state: over.state.or(self.state),
            datacenter_id: over.datacenter_id.or(self.datacenter_id),
            payment_term: over.payment_term.or(self.payment_term),
            client_conn_throttle: over.client_conn_throttle.or(self.client_conn_throttle),
            on_ambiguous: over.on_ambiguous.or(self.on_ambiguous),
        }
    }
}

/// Load a JSON parameters file.
pub fn load_params(path: &Path) -> SyncResult<Params> {
    let bytes = fs::read(path).map_err(|err| {
        SyncError::config(format!("read parameters file {}: {err}", path.display()))
    })?;
    parse_params(&bytes)
        .map_err(|err| SyncError::config(format!("parameters file {}: {err}", path.display())))
}

fn parse_params(bytes: &[u8]) -> Result<Params, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
