//! CLI argument parsing.
//!
//! Flags mirror the option names accepted in a `--params` file; validation
//! happens later, on the merged parameters.
use crate::api::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::desired::{AmbiguityPolicy, DesiredState};
use crate::params::Params;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nbsync",
    version,
    about = "Converge a Linode NodeBalancer to a declared state",
    after_help = "Prints a JSON result on stdout: {\"changed\", \"instance\", \"instances\"} on success, {\"failed\": true, \"msg\"} on failure.\n\nExamples:\n  nbsync --name web --datacenter-id 7\n  nbsync --node-balancer-id 1234 --name web --client-conn-throttle 10\n  nbsync --name web --state absent\n  nbsync --params nodebalancer.json --dry-run"
)]
pub struct RootArgs {
    /// Linode API key (falls back to LINODE_API_KEY)
    #[arg(long, visible_alias = "linode-api-id", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Label of the NodeBalancer; used for lookup when no id is given
    #[arg(long)]
    pub name: Option<String>,

    /// Id of the NodeBalancer; takes precedence over --name for lookup
    #[arg(long, value_name = "ID")]
    pub node_balancer_id: Option<u64>,

    /// Desired lifecycle state [default: present]
    #[arg(long, value_enum)]
    pub state: Option<DesiredState>,

    /// Datacenter to create in, 2-9 [default: 7]
    #[arg(long, value_name = "ID")]
    pub datacenter_id: Option<u32>,

    /// Billing term in months: 1, 12 or 24 [default: 1]
    #[arg(long, visible_alias = "paymentterm", value_name = "MONTHS")]
    pub payment_term: Option<u32>,

    /// Allowed connections per second per client IP, 0 disables [default: 0]
    #[arg(long, value_name = "N")]
    pub client_conn_throttle: Option<u32>,

    /// What to do when --name matches several NodeBalancers [default: reject]
    #[arg(long, value_enum)]
    pub on_ambiguous: Option<AmbiguityPolicy>,

    /// JSON file with the same options; flags override its values
    #[arg(long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    /// Linode API endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Look up and plan only; issue no writes
    #[arg(long)]
    pub dry_run: bool,

    /// Log debug detail to stderr
    #[arg(long)]
    pub verbose: bool,
}

impl RootArgs {
    /// The option values given as flags.
    pub fn flag_params(&self) -> Params {
        Params {
            api_key: self.api_key.clone(),
            name: self.name.clone(),
            node_balancer_id: self.node_balancer_id,
            state: self.state,
            datacenter_id: self.datacenter_id,
            payment_term: self.payment_term,
            client_conn_throttle: self.client_conn_throttle,
            on_ambiguous: self.on_ambiguous,
        }
    }
}
