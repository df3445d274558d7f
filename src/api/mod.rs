//! Remote NodeBalancer API boundary.
//!
//! The reconciler only sees [`NodeBalancerApi`]; the concrete client is built
//! by the front-end and passed in.
mod linode;
#[cfg(test)]
pub(crate) mod memory;

pub use linode::{LinodeClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

use crate::desired::PaymentTerm;
use crate::error::SyncResult;
use serde::Serialize;

/// A NodeBalancer as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeBalancer {
    pub id: u64,
    pub label: String,
    pub datacenter_id: u32,
    pub client_conn_throttle: u32,
    /// Not every API version reports the billing term back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_term: Option<PaymentTerm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

/// Parameters for a create call. The throttle is not part of create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRequest {
    pub datacenter_id: u32,
    pub payment_term: PaymentTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Parameters for an update call. Creation-only fields have no slot here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    pub id: u64,
    /// Only set when the label changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub client_conn_throttle: u32,
}

/// The primitive operations the reconciler needs.
///
/// Write calls return the id the remote system reports for the affected
/// NodeBalancer; callers re-read it instead of trusting the write response.
pub trait NodeBalancerApi {
    fn find_by_id(&self, id: u64) -> SyncResult<Option<NodeBalancer>>;

    /// Every NodeBalancer whose label equals `label`, in listing order.
    fn find_by_label(&self, label: &str) -> SyncResult<Vec<NodeBalancer>>;

    fn create(&self, request: &CreateRequest) -> SyncResult<u64>;

    fn update(&self, request: &UpdateRequest) -> SyncResult<u64>;

    fn delete(&self, id: u64) -> SyncResult<()>;
}
