//! Deploy the energy trading contracts and record where they landed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use energy_gateway::config::loader::process_env;
use energy_gateway::config::validation::validate_config;
use energy_gateway::config::{BackendKind, ConfigError};
use energy_gateway::deploy::{standard_plan, DeployError, Deployer, DeploymentRecord, PollPolicy};
use energy_gateway::lifecycle::{bootstrap, probe, resolve_config};
use energy_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "energy-deploy")]
#[command(about = "Deploy energy trading contracts", version)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "ENERGY_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the deployment record.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Deploy against the in-process simulated ledger.
    #[arg(long)]
    simulated: bool,

    /// Milliseconds between status checks.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: Option<u64>,

    /// Status checks per contract before giving up.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Deployment failed");
            eprintln!("\n=== DEPLOYMENT FAILED ===\n{}", e);
            if let Some(deploy_error) = e.downcast_ref::<DeployError>() {
                let abandoned = deploy_error.abandoned();
                if !abandoned.is_empty() {
                    eprintln!("Submitted but never confirmed: {}", abandoned.join(", "));
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = resolve_config(cli.config.as_deref(), process_env)?;
    if cli.simulated {
        config.chain.backend = BackendKind::Simulated;
    }
    if let Some(interval) = cli.poll_interval_ms {
        config.deployment.poll_interval_ms = interval;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.deployment.max_attempts = max_attempts;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    logging::init_logging(&config.observability);

    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.deployment.output_dir));
    let policy = PollPolicy::from(&config.deployment);
    let network = config.chain.network;

    let context = bootstrap(config, process_env)?;
    probe(context.backend.as_ref()).await;

    tracing::info!(
        network = %network,
        interval_ms = policy.interval.as_millis() as u64,
        max_attempts = policy.max_attempts,
        "Deploying contracts"
    );

    let deployer = Deployer::new(context.backend.clone(), policy);
    let outcome = deployer.deploy_all(&standard_plan()).await?;

    let record = DeploymentRecord::new(network, &outcome);
    let path = record.write_to(&output_dir)?;

    println!("\n=== DEPLOYMENT COMPLETE ===");
    print!("{}", record.summary(context.backend.endpoints()));
    println!("Record: {}", path.display());
    Ok(())
}
