//! JSON run results written to stdout.
use crate::api::NodeBalancer;
use crate::reconcile::{Action, Outcome, Preview};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub changed: bool,
    pub instance: Option<NodeBalancer>,
    pub instances: Vec<Option<NodeBalancer>>,
    /// Present only for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned: Option<Vec<Action>>,
}

impl RunReport {
    pub fn from_outcome(outcome: Outcome) -> Self {
        RunReport {
            changed: outcome.changed,
            instances: vec![outcome.resource.clone()],
            instance: outcome.resource,
            planned: None,
        }
    }

    pub fn from_preview(preview: Preview) -> Self {
        RunReport {
            changed: preview.would_change(),
            instances: vec![preview.current.clone()],
            instance: preview.current,
            planned: Some(preview.actions),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub failed: bool,
    pub msg: String,
}

impl FailureReport {
    pub fn new(msg: String) -> Self {
        FailureReport { failed: true, msg }
    }
}

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize run result")?;
    writeln!(out, "{json}").context("write run result")?;
    Ok(())
}
