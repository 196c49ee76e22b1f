//! # Fleet Dispatch CLI
//!
//! Command-line surface of the dispatch coordinator. Takes the five named
//! dispatch parameters (flags with environment-variable fallbacks),
//! validates them before any remote call, submits the command, and prints
//! the acknowledged command id plus how to tail the log sink. Follow mode
//! is opt-in.
//!
//! The payload artifact must already be at its payload location; use the
//! library's release orchestration when build and upload should be
//! sequenced explicitly.

use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use fleet_dispatch::config::CoordinatorConfig;
use fleet_dispatch::constants::params;
use fleet_dispatch::dispatch::{
    CancellationHandle, ProcessFleetManager, ProcessLogSink, StatusPoller,
};
use fleet_dispatch::logging::init_structured_logging;
use fleet_dispatch::orchestration::ReleaseCoordinator;
use fleet_dispatch::{CoordinatorError, DispatchParameters, ExecutionStatus};

#[derive(Parser)]
#[command(name = "fleet-dispatch")]
#[command(about = "Dispatch a command to a fleet-managed node and observe it via its log sink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Identity of the fleet-managed target node
    #[arg(long, env = "FLEET_TARGET_ID")]
    target_id: Option<String>,

    /// Object store location of the payload artifact
    #[arg(long, env = "FLEET_PAYLOAD_URI")]
    payload_uri: Option<String>,

    /// Playbook/script identifier the node should execute
    #[arg(long, env = "FLEET_EXECUTION_DIRECTIVE")]
    execution_directive: Option<String>,

    /// Log sink the node's execution output is written to
    #[arg(long, env = "FLEET_LOG_SINK")]
    log_sink: Option<String>,

    /// Region/zone of the target and its fleet manager
    #[arg(long, env = "FLEET_REGION")]
    region: Option<String>,

    /// Coordinator settings file (TOML); defaults apply when omitted
    #[arg(long, env = "FLEET_DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Block until the command reaches a terminal status
    #[arg(long)]
    follow: bool,
}

impl Cli {
    /// Snapshot the provided inputs into the explicit parameter map the
    /// library validates. Absent flags stay absent so validation names
    /// the first missing one.
    fn parameter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let pairs = [
            (params::TARGET_ID, &self.target_id),
            (params::PAYLOAD_URI, &self.payload_uri),
            (params::EXECUTION_DIRECTIVE, &self.execution_directive),
            (params::LOG_SINK, &self.log_sink),
            (params::REGION, &self.region),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                map.insert(key.to_string(), value.clone());
            }
        }
        map
    }
}

#[tokio::main]
async fn main() {
    init_structured_logging();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = CoordinatorConfig::load(cli.config.as_deref())?;
    let sink = Arc::new(ProcessLogSink::from_config(&config.backend));
    let coordinator = ReleaseCoordinator::new(
        Arc::new(ProcessFleetManager::from_config(&config.backend)),
        Arc::clone(&sink) as Arc<dyn fleet_dispatch::LogSink>,
        config.clone(),
    );

    // validation happens here, before any remote call
    let parameters = DispatchParameters::from_map(&cli.parameter_map())?;
    let result = coordinator.dispatch_only(&parameters).await?;

    println!("command_id: {}", result.command_id);
    println!(
        "tail the log sink: {}",
        coordinator.tail_instructions(&parameters, &result.command_id)
    );

    if !cli.follow {
        return Ok(());
    }

    let cancel = CancellationHandle::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let poller = StatusPoller::new(sink, config.poll_interval());
    let status = poller
        .follow(
            &parameters.log_sink,
            &result.command_id,
            config.follow_timeout(),
            &cancel,
        )
        .await?;

    println!("terminal status: {status}");
    match status {
        ExecutionStatus::Succeeded => Ok(()),
        ExecutionStatus::Failed => Err(CoordinatorError::command_failed(
            result.command_id,
            &parameters.log_sink,
        )
        .into()),
        ExecutionStatus::TimedOut => Err(CoordinatorError::timed_out(
            result.command_id,
            config.follow_timeout(),
        )
        .into()),
        other => Err(CoordinatorError::invariant(format!(
            "follow returned non-terminal status {other}"
        ))
        .into()),
    }
}
