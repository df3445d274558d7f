use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod credentials;
mod desired;
mod error;
mod output;
mod params;
mod reconcile;

use crate::api::LinodeClient;
use crate::cli::RootArgs;
use crate::desired::DesiredSpec;
use crate::error::SyncError;
use crate::output::{write_json, FailureReport, RunReport};
use crate::params::{load_params, Params};

fn main() -> ExitCode {
    let args = match RootArgs::try_parse() {
        Ok(args) => args,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => {
            let report = FailureReport::new(err.to_string().trim_end().to_string());
            if let Err(write_err) = write_json(&mut io::stdout().lock(), &report) {
                eprintln!("error: {write_err:#}");
            }
            return ExitCode::FAILURE;
        }
    };
    init_tracing(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args) {
        Ok(report) => match write_json(&mut stdout, &report) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            let msg = failure_message(&err);
            if let Some(kind) = err.downcast_ref::<SyncError>().map(SyncError::kind) {
                tracing::error!(kind, "{msg}");
            }
            if let Err(write_err) = write_json(&mut stdout, &FailureReport::new(msg)) {
                eprintln!("error: {write_err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Resolve inputs, then converge (or preview) the NodeBalancer.
fn run(args: &RootArgs) -> Result<RunReport> {
    let file_params = match &args.params {
        Some(path) => load_params(path)?,
        None => Params::default(),
    };
    let params = file_params.overlay(args.flag_params());
    let desired = DesiredSpec::from_params(&params)?;
    let api_key = credentials::resolve_api_key(params.api_key.as_deref())?;

    let client = LinodeClient::new(
        &args.api_url,
        api_key,
        Duration::from_secs(args.timeout_secs),
    );
    client.test_echo()?;
    tracing::debug!(api_url = %args.api_url, "api key accepted");

    if args.dry_run {
        let preview = reconcile::preview(&client, &desired)?;
        return Ok(RunReport::from_preview(preview));
    }
    let outcome = reconcile::reconcile(&client, &desired)?;
    Ok(RunReport::from_outcome(outcome))
}

/// `--help` and `--version` print their text and exit successfully.
fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SyncError>() {
        Some(sync_err) => sync_err.to_string(),
        None => format!("{err:#}"),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "nbsync=debug" } else { "nbsync=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
