//! In-memory `NodeBalancerApi` for unit tests.
//!
//! Records every call and can fail a chosen operation with a provider error.
use super::{CreateRequest, NodeBalancer, NodeBalancerApi, UpdateRequest};
use crate::desired::PaymentTerm;
use crate::error::{SyncError, SyncResult};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    FindById,
    FindByLabel,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    FindById(u64),
    FindByLabel(String),
    Create(CreateRequest),
    Update(UpdateRequest),
    Delete(u64),
}

impl Call {
    pub(crate) fn is_write(&self) -> bool {
        matches!(self, Call::Create(_) | Call::Update(_) | Call::Delete(_))
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    balancers: Vec<NodeBalancer>,
    calls: Vec<Call>,
    failure: Option<(Op, i64, String)>,
    /// Applied to labels on write, standing in for server-side canonicalization.
    trim_labels: bool,
    /// Drop the NodeBalancer right after create/update, as a concurrent delete would.
    vanish_after_write: bool,
}

pub(crate) struct MemoryApi {
    state: RefCell<State>,
}

impl MemoryApi {
    pub(crate) fn new() -> Self {
        MemoryApi {
            state: RefCell::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    /// Seed an existing NodeBalancer and return its id.
    pub(crate) fn seed(&self, label: &str, datacenter_id: u32, throttle: u32) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.balancers.push(balancer(
            id,
            label,
            datacenter_id,
            PaymentTerm::Monthly,
            throttle,
        ));
        id
    }

    pub(crate) fn fail(&self, op: Op, code: i64, message: &str) {
        self.state.borrow_mut().failure = Some((op, code, message.to_string()));
    }

    pub(crate) fn trim_labels(&self) {
        self.state.borrow_mut().trim_labels = true;
    }

    pub(crate) fn vanish_after_write(&self) {
        self.state.borrow_mut().vanish_after_write = true;
    }

    pub(crate) fn get(&self, id: u64) -> Option<NodeBalancer> {
        self.state
            .borrow()
            .balancers
            .iter()
            .find(|balancer| balancer.id == id)
            .cloned()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, op: Op, call: Call) -> SyncResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        match &state.failure {
            Some((failing, code, message)) if *failing == op => {
                Err(SyncError::remote(code, message.clone()))
            }
            _ => Ok(()),
        }
    }

    fn canonical_label(&self, label: &str) -> String {
        if self.state.borrow().trim_labels {
            label.trim().to_string()
        } else {
            label.to_string()
        }
    }
}

fn balancer(
    id: u64,
    label: &str,
    datacenter_id: u32,
    payment_term: PaymentTerm,
    throttle: u32,
) -> NodeBalancer {
    NodeBalancer {
        id,
        label: label.to_string(),
        datacenter_id,
        client_conn_throttle: throttle,
        payment_term: Some(payment_term),
        hostname: Some(format!("nb-{id}.example.nodebalancer.linode.com")),
        ipv4: None,
        ipv6: None,
    }
}

impl NodeBalancerApi for MemoryApi {
    fn find_by_id(&self, id: u64) -> SyncResult<Option<NodeBalancer>> {
        self.record(Op::FindById, Call::FindById(id))?;
        Ok(self.get(id))
    }

    fn find_by_label(&self, label: &str) -> SyncResult<Vec<NodeBalancer>> {
        self.record(Op::FindByLabel, Call::FindByLabel(label.to_string()))?;
        Ok(self
            .state
            .borrow()
            .balancers
            .iter()
            .filter(|balancer| balancer.label == label)
            .cloned()
            .collect())
    }

    fn create(&self, request: &CreateRequest) -> SyncResult<u64> {
        self.record(Op::Create, Call::Create(request.clone()))?;
        let label = self.canonical_label(request.label.as_deref().unwrap_or_default());
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.balancers.push(balancer(
            id,
            &label,
            request.datacenter_id,
            request.payment_term,
            0,
        ));
        if state.vanish_after_write {
            state.balancers.retain(|balancer| balancer.id != id);
        }
        Ok(id)
    }

    fn update(&self, request: &UpdateRequest) -> SyncResult<u64> {
        self.record(Op::Update, Call::Update(request.clone()))?;
        let label = request
            .label
            .as_deref()
            .map(|label| self.canonical_label(label));
        let mut state = self.state.borrow_mut();
        let Some(existing) = state
            .balancers
            .iter_mut()
            .find(|balancer| balancer.id == request.id)
        else {
            return Err(SyncError::remote(5, "Object not found"));
        };
        if let Some(label) = label {
            existing.label = label;
        }
        existing.client_conn_throttle = request.client_conn_throttle;
        let id = existing.id;
        if state.vanish_after_write {
            state.balancers.retain(|balancer| balancer.id != id);
        }
        Ok(id)
    }

    fn delete(&self, id: u64) -> SyncResult<()> {
        self.record(Op::Delete, Call::Delete(id))?;
        let mut state = self.state.borrow_mut();
        let before = state.balancers.len();
        state.balancers.retain(|balancer| balancer.id != id);
        if state.balancers.len() == before {
            return Err(SyncError::remote(5, "Object not found"));
        }
        Ok(())
    }
}
