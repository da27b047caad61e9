//! ThinkAgile CP command handlers
//!
//! One binary, one subcommand per handler:
//! - instance: application instances (create, delete, power transitions)
//! - network: VLAN and VNET virtual networks
//! - datacenter: virtual datacenters with resource allocations
//! - info: read-only inventory queries
//!
//! Each handler reads a YAML task-parameter file, reconciles the declared
//! state against the portal, and prints a JSON result report on stdout. The
//! process exits 1 when the report says failed.

mod error;
mod params;
#[cfg(test)]
mod params_test;
mod reconciler;
mod result;
mod wait;

use crate::error::ModuleError;
use crate::result::ModuleResult;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tacp_client::{TacpClient, TacpClientTrait};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tacp-module", version, about = "ThinkAgile CP automation modules")]
struct Cli {
    /// API key generated in the Developer Options of the ThinkAgile CP portal
    #[arg(long, env = "TACP_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Portal URL of the ThinkAgile CP organization
    #[arg(long, default_value = "https://manage.cp.lenovo.com")]
    portal_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage application instances
    Instance {
        /// YAML task-parameter file
        #[arg(long)]
        params: PathBuf,
    },
    /// Manage VLAN and VNET networks
    Network {
        /// YAML task-parameter file
        #[arg(long)]
        params: PathBuf,
    },
    /// Create virtual datacenters
    Datacenter {
        /// YAML task-parameter file
        #[arg(long)]
        params: PathBuf,
    },
    /// Query platform inventory
    Info {
        /// YAML task-parameter file
        #[arg(long)]
        params: PathBuf,
    },
}

fn load_params<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModuleError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ModuleError::Validation(format!("cannot read parameter file {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        ModuleError::Validation(format!("cannot parse parameter file {}: {e}", path.display()))
    })
}

async fn run(cli: Cli) -> Result<ModuleResult, ModuleError> {
    let client = TacpClient::new(cli.portal_url, cli.api_key)?;
    client.validate_api_key().await?;
    debug!("Authenticated against {}", client.base_url());

    match cli.command {
        Command::Instance { params } => {
            let params = load_params(&params)?;
            reconciler::instance::reconcile(&client, &params).await
        }
        Command::Network { params } => {
            let params = load_params(&params)?;
            reconciler::network::reconcile(&client, &params).await
        }
        Command::Datacenter { params } => {
            let params = load_params(&params)?;
            reconciler::datacenter::reconcile(&client, &params).await
        }
        Command::Info { params } => {
            let params = load_params(&params)?;
            reconciler::info::query(&client, &params).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match run(cli).await {
        Ok(result) => result,
        Err(e) => ModuleResult::from_error(&e),
    };

    match serde_json::to_string_pretty(&result) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            error!("Failed to serialize result report: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
