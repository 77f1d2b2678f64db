//! AtomicRename Simulator
//!
//! Demonstration driver: seeds a handful of participants with one key
//! each, wires them to a coordinator over the mailbox transport, runs a
//! scenario, and reports outcomes and final store contents.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cluster;
mod scenario;

use atomicrename_common::TransactionOutcome;
use atomicrename_coordinator::CoordinatorConfig;
use cluster::Cluster;
use scenario::{Scenario, ScenarioStep};

/// AtomicRename Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "AtomicRename demonstration driver")]
struct Args {
    /// Number of participants to create
    #[arg(short, long, default_value = "5")]
    participants: usize,

    /// Scenario to run (rename, missing-key, contended)
    #[arg(short, long, default_value = "rename")]
    scenario: String,

    /// Override: old key of a single rename transaction
    #[arg(long)]
    old_key: Option<String>,

    /// Override: new key of a single rename transaction
    #[arg(long)]
    new_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let scenario = match (&args.old_key, &args.new_key) {
        (Some(old_key), Some(new_key)) => Scenario::single_rename(old_key, new_key),
        (None, None) => Scenario::load(&args.scenario)?,
        _ => anyhow::bail!("--old-key and --new-key must be given together"),
    };

    info!("Starting AtomicRename Simulator");
    info!("Participants: {}", args.participants);
    info!("Scenario: {} ({})", scenario.name, scenario.description);

    let config = CoordinatorConfig::from_env();
    if let Err(e) = config.validate() {
        anyhow::bail!("Configuration error: {e}");
    }

    let cluster = Cluster::build(args.participants, config);

    for step in &scenario.steps {
        match step {
            ScenarioStep::HoldLock {
                participant_index,
                key,
            } => {
                cluster.hold_lock(*participant_index, key)?;
            }
            ScenarioStep::Rename { old_key, new_key } => {
                let outcome = cluster
                    .coordinator()
                    .initiate_transaction(old_key, new_key)
                    .await?;
                match &outcome {
                    TransactionOutcome::Committed => {
                        info!(
                            old_key = %old_key,
                            new_key = %new_key,
                            "Transaction committed"
                        );
                    }
                    TransactionOutcome::Aborted {
                        participant,
                        reason,
                    } => {
                        info!(
                            old_key = %old_key,
                            new_key = %new_key,
                            participant_id = %participant,
                            reason = ?reason,
                            "Transaction aborted"
                        );
                    }
                }
            }
        }
    }

    cluster.report_stores();

    let metrics = cluster.coordinator().metrics();
    info!("Simulation complete");
    info!("Total transactions: {}", metrics.transactions_total);
    info!("Committed: {}", metrics.transactions_committed);
    info!("Aborted: {}", metrics.transactions_aborted);

    Ok(())
}
