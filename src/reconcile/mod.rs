//! Lookup, diff and converge for a single NodeBalancer.
//!
//! [`plan`] is a pure function over the desired spec and the current remote
//! state; [`reconcile`] wraps it with the lookup before and the writes and
//! re-reads after. A run issues at most three remote calls: the lookup, one
//! write, and the re-read of the written NodeBalancer.
//!
//! There is no optimistic-concurrency check. If another actor changes the
//! NodeBalancer between the lookup and the write, the last write wins.
//!
//! Targeting by id alone is not idempotent when the id does not exist: with
//! `state = present` every run creates a fresh NodeBalancer under a new id,
//! and the next run looks up the old id again and misses. Supply a name as
//! well, or switch to the created id, to converge.
mod actions;

pub use actions::Action;

use crate::api::{CreateRequest, NodeBalancer, NodeBalancerApi, UpdateRequest};
use crate::desired::{AmbiguityPolicy, DesiredSpec, DesiredState, Identifier};
use crate::error::{SyncError, SyncResult};

/// Result of a converging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub changed: bool,
    /// The NodeBalancer as re-read after the last write, or as found.
    pub resource: Option<NodeBalancer>,
}

/// Result of a lookup-only run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub current: Option<NodeBalancer>,
    pub actions: Vec<Action>,
}

impl Preview {
    pub fn would_change(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Drive the remote NodeBalancer to `desired`.
pub fn reconcile<A: NodeBalancerApi + ?Sized>(
    api: &A,
    desired: &DesiredSpec,
) -> SyncResult<Outcome> {
    let current = lookup(api, &desired.identifier, desired.on_ambiguous)?;
    let actions = plan(desired, current.as_ref());
    if actions.is_empty() {
        tracing::info!(identifier = %desired.identifier, "already converged");
        return Ok(Outcome {
            changed: false,
            resource: current,
        });
    }

    let mut resource = current;
    for action in &actions {
        tracing::info!(action = action.kind(), "{action}");
        resource = apply(api, action)?;
    }
    Ok(Outcome {
        changed: true,
        resource,
    })
}

/// Look up the current state and plan, without writing anything.
pub fn preview<A: NodeBalancerApi + ?Sized>(
    api: &A,
    desired: &DesiredSpec,
) -> SyncResult<Preview> {
    let current = lookup(api, &desired.identifier, desired.on_ambiguous)?;
    let actions = plan(desired, current.as_ref());
    Ok(Preview { current, actions })
}

/// Resolve the managed NodeBalancer by id, or by label when no id is given.
pub fn lookup<A: NodeBalancerApi + ?Sized>(
    api: &A,
    identifier: &Identifier,
    on_ambiguous: AmbiguityPolicy,
) -> SyncResult<Option<NodeBalancer>> {
    let found = match identifier {
        Identifier::Id(id) => api.find_by_id(*id)?,
        Identifier::Name(name) => {
            let matches = api.find_by_label(name)?;
            if matches.len() > 1 {
                let ids: Vec<u64> = matches.iter().map(|balancer| balancer.id).collect();
                match on_ambiguous {
                    AmbiguityPolicy::Reject => {
                        return Err(SyncError::AmbiguousLookup {
                            label: name.clone(),
                            ids,
                        })
                    }
                    AmbiguityPolicy::First => {
                        tracing::warn!(
                            label = %name,
                            ?ids,
                            "label matches several NodeBalancers; using the first"
                        );
                    }
                }
            }
            matches.into_iter().next()
        }
    };
    match &found {
        Some(balancer) => tracing::debug!(
            %identifier,
            id = balancer.id,
            label = %balancer.label,
            "lookup hit"
        ),
        None => tracing::debug!(%identifier, "lookup miss"),
    }
    Ok(found)
}

/// Compute the writes that take `current` to `desired`. Empty means converged.
///
/// Comparisons are made against `current`, which is the server's canonical
/// form, never against an earlier desired value.
pub fn plan(desired: &DesiredSpec, current: Option<&NodeBalancer>) -> Vec<Action> {
    match (current, desired.state) {
        (Some(current), DesiredState::Present) => {
            let label = desired
                .label
                .as_ref()
                .filter(|label| **label != current.label)
                .cloned();
            let throttle_differs = current.client_conn_throttle != desired.client_conn_throttle;
            if label.is_none() && !throttle_differs {
                return Vec::new();
            }
            vec![Action::Update(UpdateRequest {
                id: current.id,
                label,
                client_conn_throttle: desired.client_conn_throttle,
            })]
        }
        (Some(current), DesiredState::Absent) => vec![Action::Delete { id: current.id }],
        (None, DesiredState::Present) => {
            if let Identifier::Id(id) = desired.identifier {
                tracing::warn!(id, "NodeBalancer not found by id; the created one gets a new id");
            }
            if desired.client_conn_throttle != 0 {
                tracing::warn!(
                    throttle = desired.client_conn_throttle,
                    "client_conn_throttle is not set at creation; the next run applies it"
                );
            }
            vec![Action::Create(CreateRequest {
                datacenter_id: desired.datacenter_id,
                payment_term: desired.payment_term,
                label: desired.label.clone(),
            })]
        }
        (None, DesiredState::Absent) => Vec::new(),
    }
}

fn apply<A: NodeBalancerApi + ?Sized>(
    api: &A,
    action: &Action,
) -> SyncResult<Option<NodeBalancer>> {
    match action {
        Action::Create(request) => {
            let id = api.create(request)?;
            refetch(api, id, "create").map(Some)
        }
        Action::Update(request) => {
            let id = api.update(request)?;
            refetch(api, id, "update").map(Some)
        }
        Action::Delete { id } => {
            api.delete(*id)?;
            Ok(None)
        }
    }
}

fn refetch<A: NodeBalancerApi + ?Sized>(
    api: &A,
    id: u64,
    action: &'static str,
) -> SyncResult<NodeBalancer> {
    api.find_by_id(id)?
        .ok_or(SyncError::MissingAfterWrite { id, action })
}
