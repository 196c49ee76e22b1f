//! Mock fleet manager, log sink, and step handlers.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fleet_dispatch::config::DispatchParameters;
use fleet_dispatch::constants::params;
use fleet_dispatch::dispatch::{DispatchRequest, DispatchResult, ExecutionStatus};
use fleet_dispatch::error::{CoordinatorError, Result};
use fleet_dispatch::orchestration::StepContext;
use fleet_dispatch::{FleetManager, LogSink, StepHandler};

/// Fleet manager that records every submission and returns a fixed
/// command id.
pub struct RecordingFleetManager {
    command_id: String,
    submissions: Arc<Mutex<Vec<DispatchRequest>>>,
    fail: bool,
}

impl RecordingFleetManager {
    pub fn new(command_id: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A manager whose every submission fails with `SubmissionError`.
    pub fn failing() -> Self {
        Self {
            command_id: String::new(),
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn submissions(&self) -> Vec<DispatchRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl FleetManager for RecordingFleetManager {
    async fn submit(&self, request: &DispatchRequest) -> Result<DispatchResult> {
        self.submissions.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(CoordinatorError::submission(
                &request.target_id,
                "mock fleet manager rejected the request",
            ));
        }
        Ok(DispatchResult::new(&self.command_id))
    }

    fn backend_name(&self) -> &'static str {
        "mock-fleet"
    }
}

/// Log sink that plays back a scripted status sequence, repeating the
/// last entry once the script is exhausted, and counts polls.
pub struct ScriptedLogSink {
    script: Mutex<VecDeque<ExecutionStatus>>,
    last: ExecutionStatus,
    polls: AtomicUsize,
}

impl ScriptedLogSink {
    pub fn new(script: Vec<ExecutionStatus>, last: ExecutionStatus) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last,
            polls: AtomicUsize::new(0),
        }
    }

    /// A sink that never reports a terminal status.
    pub fn never_terminal() -> Self {
        Self::new(Vec::new(), ExecutionStatus::InProgress)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSink for ScriptedLogSink {
    async fn query(&self, _sink: &str, _command_id: &str) -> Result<ExecutionStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().pop_front().unwrap_or(self.last))
    }

    fn backend_name(&self) -> &'static str {
        "mock-sink"
    }
}

/// Log sink whose every query fails with `PollError`.
pub struct UnreachableLogSink;

#[async_trait]
impl LogSink for UnreachableLogSink {
    async fn query(&self, sink: &str, _command_id: &str) -> Result<ExecutionStatus> {
        Err(CoordinatorError::poll(sink, "mock sink unreachable"))
    }

    fn backend_name(&self) -> &'static str {
        "mock-sink"
    }
}

/// Step handler that records executions and returns a fixed outcome.
pub struct ScriptedStep {
    artifact: Option<String>,
    fail_with: Option<String>,
    executions: Arc<AtomicUsize>,
}

impl ScriptedStep {
    pub fn succeeding(artifact: Option<&str>) -> Self {
        Self {
            artifact: artifact.map(str::to_string),
            fail_with: None,
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            artifact: None,
            fail_with: Some(message.into()),
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared execution counter, usable after the handler moved into a run.
    pub fn execution_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.executions)
    }
}

#[async_trait]
impl StepHandler for ScriptedStep {
    async fn execute(&self, _ctx: &StepContext) -> Result<Option<String>> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(CoordinatorError::submission("mock-step", message.clone())),
            None => Ok(self.artifact.clone()),
        }
    }
}

/// A complete, valid parameter map for tests.
pub fn complete_params() -> HashMap<String, String> {
    HashMap::from([
        (params::TARGET_ID.to_string(), "node-7".to_string()),
        (
            params::PAYLOAD_URI.to_string(),
            "store://releases/app-1.4.2.tar.gz".to_string(),
        ),
        (
            params::EXECUTION_DIRECTIVE.to_string(),
            "deploy-app".to_string(),
        ),
        (params::LOG_SINK.to_string(), "deploy-log".to_string()),
        (params::REGION.to_string(), "eu-central-1".to_string()),
    ])
}

/// The validated view of [`complete_params`].
pub fn complete_parameters() -> DispatchParameters {
    DispatchParameters::from_map(&complete_params()).unwrap()
}
