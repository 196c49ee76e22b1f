//! # Release Coordinator
//!
//! Sequences one release attempt end to end: precondition validation,
//! artifact preparation (build and upload, injected collaborators),
//! dispatch, and out-of-band observation, with explicit dependency
//! ordering. A failed build never triggers a dispatch.
//!
//! The coordinator offers no mutual exclusion across runs: concurrent
//! releases against the same target are a caller-level policy.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::{CoordinatorConfig, DispatchParameters};
use crate::constants::steps;
use crate::dispatch::builder::CommandTemplate;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::fleet::{FleetManager, LogSink};
use crate::dispatch::poller::{CancellationHandle, StatusPoller};
use crate::dispatch::types::{DispatchResult, ExecutionStatus};
use crate::error::{CoordinatorError, Result};
use crate::orchestration::workflow::{StepContext, StepHandler, WorkflowRun};

/// Dispatch step: builds the command request for this attempt's
/// `client_token` and submits it. Artifact: the acknowledged command id.
struct DispatchStep {
    fleet: Arc<dyn FleetManager>,
    template: CommandTemplate,
    parameters: DispatchParameters,
}

#[async_trait::async_trait]
impl StepHandler for DispatchStep {
    async fn execute(&self, ctx: &StepContext) -> Result<Option<String>> {
        let request = self.template.build(&self.parameters, ctx.client_token)?;
        let result = Dispatcher::new(Arc::clone(&self.fleet)).submit(&request).await?;
        Ok(Some(result.command_id))
    }
}

/// Observe step: follows the log sink until the dispatched command
/// reaches a terminal status. A remote failure or an elapsed follow
/// window fails the step (and with it, the run).
struct ObserveStep {
    sink: Arc<dyn LogSink>,
    sink_id: String,
    poll_interval: Duration,
    follow_timeout: Duration,
}

#[async_trait::async_trait]
impl StepHandler for ObserveStep {
    async fn execute(&self, ctx: &StepContext) -> Result<Option<String>> {
        let command_id = ctx
            .artifact(steps::DISPATCH)
            .ok_or_else(|| {
                CoordinatorError::invariant("observe step ran without a dispatched command id")
            })?
            .to_string();

        let poller = StatusPoller::new(Arc::clone(&self.sink), self.poll_interval);
        let status = poller
            .follow(&self.sink_id, &command_id, self.follow_timeout, &ctx.cancel)
            .await?;

        match status {
            ExecutionStatus::Succeeded => Ok(Some(status.to_string())),
            ExecutionStatus::Failed => {
                Err(CoordinatorError::command_failed(command_id, &self.sink_id))
            }
            ExecutionStatus::TimedOut => {
                Err(CoordinatorError::timed_out(command_id, self.follow_timeout))
            }
            other => Err(CoordinatorError::invariant(format!(
                "follow returned non-terminal status {other}"
            ))),
        }
    }
}

/// Coordinates releases against one fleet manager and log sink pair.
pub struct ReleaseCoordinator {
    fleet: Arc<dyn FleetManager>,
    sink: Arc<dyn LogSink>,
    config: CoordinatorConfig,
}

impl ReleaseCoordinator {
    pub fn new(
        fleet: Arc<dyn FleetManager>,
        sink: Arc<dyn LogSink>,
        config: CoordinatorConfig,
    ) -> Self {
        Self { fleet, sink, config }
    }

    /// Dispatch without the surrounding workflow.
    ///
    /// Takes parameters already validated by construction (see
    /// [`DispatchParameters::from_map`]), so no check runs twice. The
    /// payload artifact must already be at its payload location; that
    /// precondition belongs to the caller here. A fresh `client_token`
    /// is generated for this attempt.
    pub async fn dispatch_only(&self, parameters: &DispatchParameters) -> Result<DispatchResult> {
        let request = CommandTemplate::default().build(parameters, Uuid::new_v4())?;
        let result = Dispatcher::new(Arc::clone(&self.fleet)).submit(&request).await?;

        info!(
            command_id = %result.command_id,
            log_sink = %parameters.log_sink,
            "Dispatched; observe the log sink for progress"
        );
        Ok(result)
    }

    /// Assemble the canonical release run: build -> upload -> dispatch ->
    /// observe. Build and upload are injected collaborators; dispatch and
    /// observe are wired to this coordinator's capabilities.
    pub fn release_run(
        &self,
        parameters: DispatchParameters,
        build: Arc<dyn StepHandler>,
        upload: Arc<dyn StepHandler>,
    ) -> WorkflowRun {
        let sink_id = parameters.log_sink.clone();
        WorkflowRun::new("release")
            .with_step(steps::BUILD, &[], build)
            .with_step(steps::UPLOAD, &[steps::BUILD], upload)
            .with_step(
                steps::DISPATCH,
                &[steps::UPLOAD],
                Arc::new(DispatchStep {
                    fleet: Arc::clone(&self.fleet),
                    template: CommandTemplate::default(),
                    parameters,
                }),
            )
            .with_step(
                steps::OBSERVE,
                &[steps::DISPATCH],
                Arc::new(ObserveStep {
                    sink: Arc::clone(&self.sink),
                    sink_id,
                    poll_interval: self.config.poll_interval(),
                    follow_timeout: self.config.follow_timeout(),
                }),
            )
    }

    /// Run one full release attempt from a named-parameter map.
    ///
    /// Validation precedes every remote call; the returned run carries
    /// the terminal state, per-step states, and the failed step and error
    /// kind when the run halted.
    pub async fn run_release(
        &self,
        input: &HashMap<String, String>,
        build: Arc<dyn StepHandler>,
        upload: Arc<dyn StepHandler>,
        cancel: &CancellationHandle,
    ) -> Result<WorkflowRun> {
        let parameters = DispatchParameters::from_map(input)?;
        let mut run = self.release_run(parameters, build, upload);
        run.execute(cancel).await?;
        Ok(run)
    }

    /// One-line instruction for tailing the log sink independently of
    /// the coordinator.
    pub fn tail_instructions(&self, parameters: &DispatchParameters, command_id: &str) -> String {
        let backend = &self.config.backend;
        std::iter::once(backend.query_program.as_str())
            .chain(backend.query_args.iter().map(String::as_str))
            .chain(["--log-sink", &parameters.log_sink, "--command-id", command_id])
            .collect::<Vec<_>>()
            .join(" ")
    }
}
