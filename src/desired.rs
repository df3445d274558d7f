//! Desired NodeBalancer state, validated from invocation parameters.
use crate::error::{SyncError, SyncResult};
use crate::params::Params;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// London.
pub const DEFAULT_DATACENTER_ID: u32 = 7;
pub const VALID_DATACENTER_IDS: RangeInclusive<u32> = 2..=9;

/// Desired lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

/// What to do when a name lookup matches more than one NodeBalancer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Fail the run and list the matching ids.
    #[default]
    Reject,
    /// Take the first match in listing order.
    First,
}

/// Billing term in months. Only settable at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PaymentTerm {
    #[default]
    Monthly,
    Yearly,
    Biennial,
}

impl PaymentTerm {
    pub fn months(self) -> u32 {
        match self {
            PaymentTerm::Monthly => 1,
            PaymentTerm::Yearly => 12,
            PaymentTerm::Biennial => 24,
        }
    }
}

impl TryFrom<u32> for PaymentTerm {
    type Error = String;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        match months {
            1 => Ok(PaymentTerm::Monthly),
            12 => Ok(PaymentTerm::Yearly),
            24 => Ok(PaymentTerm::Biennial),
            other => Err(format!("payment_term must be 1, 12 or 24 (got {other})")),
        }
    }
}

impl From<PaymentTerm> for u32 {
    fn from(term: PaymentTerm) -> u32 {
        term.months()
    }
}

impl fmt::Display for PaymentTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.months())
    }
}

/// How the managed NodeBalancer is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(u64),
    Name(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "id {id}"),
            Identifier::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredSpec {
    pub identifier: Identifier,
    pub state: DesiredState,
    /// `None` when only an id was given; the label is then left alone.
    pub label: Option<String>,
    pub datacenter_id: u32,
    pub payment_term: PaymentTerm,
    pub client_conn_throttle: u32,
    pub on_ambiguous: AmbiguityPolicy,
}

impl DesiredSpec {
    /// Validate merged parameters. Nothing here touches the network.
    pub fn from_params(params: &Params) -> SyncResult<Self> {
        let name = params
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let identifier = match (params.node_balancer_id, &name) {
            (Some(id), _) => Identifier::Id(id),
            (None, Some(name)) => Identifier::Name(name.clone()),
            (None, None) => {
                return Err(SyncError::config(
                    "one of name or node_balancer_id is required",
                ))
            }
        };

        let datacenter_id = params.datacenter_id.unwrap_or(DEFAULT_DATACENTER_ID);
        if !VALID_DATACENTER_IDS.contains(&datacenter_id) {
            return Err(SyncError::config(format!(
                "datacenter_id must be between {} and {} (got {datacenter_id})",
                VALID_DATACENTER_IDS.start(),
                VALID_DATACENTER_IDS.end()
            )));
        }

        let payment_term = match params.payment_term {
            Some(months) => PaymentTerm::try_from(months).map_err(SyncError::Config)?,
            None => PaymentTerm::default(),
        };

        Ok(DesiredSpec {
            identifier,
            state: params.state.unwrap_or_default(),
            label: name,
            datacenter_id,
            payment_term,
            client_conn_throttle: params.client_conn_throttle.unwrap_or(0),
            on_ambiguous: params.on_ambiguous.unwrap_or_default(),
        })
    }
}
