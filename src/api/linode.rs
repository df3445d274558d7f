//! Linode legacy API client.
//!
//! Every call is a form POST carrying `api_key` and `api_action`. Responses
//! share one envelope:
//!
//! ```text
//! {"ERRORARRAY": [{"ERRORCODE": 5, "ERRORMESSAGE": "..."}], "ACTION": "...", "DATA": ...}
//! ```
//!
//! A non-empty `ERRORARRAY` is a failure regardless of `DATA`.
use super::{CreateRequest, NodeBalancer, NodeBalancerApi, UpdateRequest};
use crate::credentials::ApiKey;
use crate::error::{SyncError, SyncResult, DECODE_CODE, TRANSPORT_CODE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_API_URL: &str = "https://api.linode.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Legacy API code for "object not found".
const OBJECT_NOT_FOUND: i64 = 5;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "ERRORARRAY", default)]
    errors: Vec<ApiFault>,
    #[serde(rename = "DATA", default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ApiFault {
    #[serde(rename = "ERRORCODE")]
    code: i64,
    #[serde(rename = "ERRORMESSAGE", default)]
    message: String,
}

#[derive(Deserialize)]
struct NodeBalancerRecord {
    #[serde(rename = "NODEBALANCERID")]
    id: u64,
    #[serde(rename = "LABEL")]
    label: String,
    #[serde(rename = "DATACENTERID")]
    datacenter_id: u32,
    #[serde(rename = "CLIENTCONNTHROTTLE", default)]
    client_conn_throttle: u32,
    #[serde(rename = "HOSTNAME", default)]
    hostname: Option<String>,
    #[serde(rename = "ADDRESS4", default)]
    ipv4: Option<String>,
    #[serde(rename = "ADDRESS6", default)]
    ipv6: Option<String>,
}

impl From<NodeBalancerRecord> for NodeBalancer {
    fn from(record: NodeBalancerRecord) -> Self {
        NodeBalancer {
            id: record.id,
            label: record.label,
            datacenter_id: record.datacenter_id,
            client_conn_throttle: record.client_conn_throttle,
            payment_term: None,
            hostname: record.hostname,
            ipv4: record.ipv4,
            ipv6: record.ipv6,
        }
    }
}

/// Acknowledgement returned by create, update and delete.
#[derive(Deserialize)]
struct WriteAck {
    #[serde(rename = "NodeBalancerID")]
    id: u64,
}

/// Failure of a single API call, before it is mapped to [`SyncError`].
#[derive(Debug)]
enum CallError {
    Api(ApiFault),
    Other(SyncError),
}

impl From<CallError> for SyncError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Api(fault) => SyncError::remote(fault.code, fault.message),
            CallError::Other(err) => err,
        }
    }
}

pub struct LinodeClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: ApiKey,
}

impl LinodeClient {
    pub fn new(base_url: &str, api_key: ApiKey, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        LinodeClient {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.to_string(),
            api_key,
        }
    }

    /// Round-trip a `test.echo` call to prove the key is accepted.
    pub fn test_echo(&self) -> SyncResult<()> {
        let _: Value = self.call("test.echo", &[("ping", "pong".to_string())])?;
        Ok(())
    }

    fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<T, CallError> {
        let start = Instant::now();
        let mut form: Vec<(&str, &str)> = vec![
            ("api_key", self.api_key.expose()),
            ("api_action", action),
        ];
        form.extend(params.iter().map(|(key, value)| (*key, value.as_str())));

        let mut response = self
            .agent
            .post(self.base_url.as_str())
            .send_form(form)
            .map_err(|err| {
                CallError::Other(SyncError::remote(
                    TRANSPORT_CODE,
                    format!("{action}: {err}"),
                ))
            })?;
        let envelope: Value = response.body_mut().read_json().map_err(|err| {
            CallError::Other(SyncError::remote(
                DECODE_CODE,
                format!("{action}: read response: {err}"),
            ))
        })?;

        tracing::debug!(
            action,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "api call complete"
        );
        decode_envelope(action, envelope)
    }
}

fn decode_envelope<T: DeserializeOwned>(action: &str, raw: Value) -> Result<T, CallError> {
    let envelope: Envelope = serde_json::from_value(raw).map_err(|err| {
        CallError::Other(SyncError::remote(
            DECODE_CODE,
            format!("{action}: malformed response envelope: {err}"),
        ))
    })?;
    if let Some(fault) = envelope.errors.into_iter().next() {
        return Err(CallError::Api(fault));
    }
    serde_json::from_value(envelope.data).map_err(|err| {
        CallError::Other(SyncError::remote(
            DECODE_CODE,
            format!("{action}: unexpected DATA: {err}"),
        ))
    })
}

/// A by-id listing answered with "object not found" is a miss, not a failure.
fn match_listed_id(
    id: u64,
    listed: Result<Vec<NodeBalancerRecord>, CallError>,
) -> SyncResult<Option<NodeBalancer>> {
    let records = match listed {
        Ok(records) => records,
        Err(CallError::Api(fault)) if fault.code == OBJECT_NOT_FOUND => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(records
        .into_iter()
        .find(|record| record.id == id)
        .map(NodeBalancer::from))
}

impl NodeBalancerApi for LinodeClient {
    fn find_by_id(&self, id: u64) -> SyncResult<Option<NodeBalancer>> {
        let listed = self.call("nodebalancer.list", &[("NodeBalancerID", id.to_string())]);
        match_listed_id(id, listed)
    }

    fn find_by_label(&self, label: &str) -> SyncResult<Vec<NodeBalancer>> {
        let records: Vec<NodeBalancerRecord> = self.call("nodebalancer.list", &[])?;
        Ok(records
            .into_iter()
            .filter(|record| record.label == label)
            .map(NodeBalancer::from)
            .collect())
    }

    fn create(&self, request: &CreateRequest) -> SyncResult<u64> {
        let mut params = vec![
            ("DatacenterID", request.datacenter_id.to_string()),
            ("PaymentTerm", request.payment_term.months().to_string()),
        ];
        if let Some(label) = &request.label {
            params.push(("Label", label.clone()));
        }
        let ack: WriteAck = self.call("nodebalancer.create", &params)?;
        Ok(ack.id)
    }

    fn update(&self, request: &UpdateRequest) -> SyncResult<u64> {
        let mut params = vec![
            ("NodeBalancerID", request.id.to_string()),
            ("ClientConnThrottle", request.client_conn_throttle.to_string()),
        ];
        if let Some(label) = &request.label {
            params.push(("Label", label.clone()));
        }
        let ack: WriteAck = self.call("nodebalancer.update", &params)?;
        Ok(ack.id)
    }

    fn delete(&self, id: u64) -> SyncResult<()> {
        let _: WriteAck = self.call("nodebalancer.delete", &[("NodeBalancerID", id.to_string())])?;
        Ok(())
    }
}
