//! # Workflow Run Engine
//!
//! A state machine over named steps with explicit dependency ordering.
//! A step runs only when every declared dependency succeeded; a single
//! failed step halts the run, and every step that has not run by then is
//! transitioned to Skipped, so a finished run holds only terminal step
//! states. No partial continuation past a failed prerequisite, and no
//! automatic retry. A failed run always names the exact step and error
//! kind that halted it.
//!
//! One `WorkflowRun` is one release attempt. It exclusively owns its step
//! list, lives for the duration of the attempt, and is not persisted:
//! durable history belongs to the external log sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dispatch::poller::CancellationHandle;
use crate::error::{CoordinatorError, Result};
use crate::orchestration::states::{RunState, StepState};

/// Execution context handed to each step handler.
pub struct StepContext {
    /// Identity of the run this step belongs to.
    pub run_id: Uuid,
    /// Idempotency key of this release attempt, shared by every step.
    pub client_token: Uuid,
    /// Artifacts produced by previously succeeded steps, keyed by step name.
    pub artifacts: HashMap<String, String>,
    /// Cancellation signal; long waits inside handlers must honor it.
    pub cancel: CancellationHandle,
}

impl StepContext {
    /// Artifact of a named predecessor, if it produced one.
    pub fn artifact(&self, step: &str) -> Option<&str> {
        self.artifacts.get(step).map(String::as_str)
    }
}

/// A unit of work within a workflow run.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Execute the step, optionally producing an artifact reference
    /// (an uploaded binary URI, an acknowledged command id) for
    /// dependent steps.
    async fn execute(&self, ctx: &StepContext) -> Result<Option<String>>;
}

/// Why a failed step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Stable error kind name, see [`CoordinatorError::kind`].
    pub kind: &'static str,
    /// Human-readable single-line description.
    pub message: String,
}

struct StepEntry {
    name: String,
    dependencies: Vec<String>,
    handler: Arc<dyn StepHandler>,
    state: StepState,
    artifact: Option<String>,
    failure: Option<StepFailure>,
}

impl std::fmt::Debug for StepEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEntry")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("state", &self.state)
            .field("artifact", &self.artifact)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

/// One end-to-end release attempt composed of dependent steps.
#[derive(Debug)]
pub struct WorkflowRun {
    run_id: Uuid,
    name: String,
    client_token: Uuid,
    steps: Vec<StepEntry>,
    state: RunState,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Create an empty run. A fresh idempotency `client_token` is
    /// generated here, once per release attempt.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            name: name.into(),
            client_token: Uuid::new_v4(),
            steps: Vec::new(),
            state: RunState::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Declare a step with its dependency set. Declaration order breaks
    /// ties among simultaneously ready steps, keeping execution
    /// deterministic.
    pub fn with_step(
        mut self,
        name: impl Into<String>,
        dependencies: &[&str],
        handler: Arc<dyn StepHandler>,
    ) -> Self {
        self.steps.push(StepEntry {
            name: name.into(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            handler,
            state: StepState::Pending,
            artifact: None,
            failure: None,
        });
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The release attempt's idempotency key.
    pub fn client_token(&self) -> Uuid {
        self.client_token
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Current state of a named step.
    pub fn step_state(&self, name: &str) -> Option<StepState> {
        self.step(name).map(|s| s.state)
    }

    /// Artifact produced by a named step, if any.
    pub fn step_artifact(&self, name: &str) -> Option<&str> {
        self.step(name).and_then(|s| s.artifact.as_deref())
    }

    /// The step that halted the run, with its failure, if the run failed.
    pub fn failed_step(&self) -> Option<(&str, &StepFailure)> {
        self.steps
            .iter()
            .find_map(|s| s.failure.as_ref().map(|f| (s.name.as_str(), f)))
    }

    fn step(&self, name: &str) -> Option<&StepEntry> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Execute all steps in dependency order.
    ///
    /// Step failures are captured in the run (they do not bubble as
    /// `Err`); the returned state is `Succeeded` or `Failed`. `Err` is
    /// reserved for graph invariant violations: duplicate step names,
    /// unknown dependencies, dependency cycles.
    pub async fn execute(&mut self, cancel: &CancellationHandle) -> Result<RunState> {
        self.validate_graph()?;

        self.state = RunState::Running;
        self.started_at = Some(Utc::now());
        info!(
            run_id = %self.run_id,
            run = %self.name,
            steps = self.steps.len(),
            "Workflow run started"
        );

        loop {
            let Some(index) = self.next_ready_step() else {
                break;
            };

            if cancel.is_cancelled() {
                let name = self.steps[index].name.clone();
                self.fail_step(
                    index,
                    StepFailure {
                        kind: "cancelled",
                        message: format!("run cancelled before step {name} started"),
                    },
                );
                break;
            }

            self.run_step(index, cancel).await;
            if self.state == RunState::Failed {
                break;
            }
        }

        if self.state == RunState::Failed {
            self.skip_unstarted_steps();
        } else {
            // no ready step left and nothing failed: everything succeeded
            self.state = RunState::Succeeded;
        }
        self.finished_at = Some(Utc::now());

        match self.failed_step() {
            Some((step, failure)) => error!(
                run_id = %self.run_id,
                run = %self.name,
                step,
                kind = failure.kind,
                message = %failure.message,
                "Workflow run failed"
            ),
            None => info!(run_id = %self.run_id, run = %self.name, "Workflow run succeeded"),
        }

        Ok(self.state)
    }

    async fn run_step(&mut self, index: usize, cancel: &CancellationHandle) {
        let ctx = StepContext {
            run_id: self.run_id,
            client_token: self.client_token,
            artifacts: self
                .steps
                .iter()
                .filter(|s| s.state == StepState::Succeeded)
                .filter_map(|s| s.artifact.as_ref().map(|a| (s.name.clone(), a.clone())))
                .collect(),
            cancel: cancel.clone(),
        };

        let handler = Arc::clone(&self.steps[index].handler);
        let name = self.steps[index].name.clone();

        self.steps[index].state = StepState::Running;
        info!(run_id = %self.run_id, step = %name, "Step started");

        match handler.execute(&ctx).await {
            Ok(artifact) => {
                self.steps[index].state = StepState::Succeeded;
                self.steps[index].artifact = artifact;
                info!(run_id = %self.run_id, step = %name, "Step succeeded");
            }
            Err(err) => {
                self.fail_step(
                    index,
                    StepFailure {
                        kind: err.kind(),
                        message: err.to_string(),
                    },
                );
            }
        }
    }

    fn fail_step(&mut self, index: usize, failure: StepFailure) {
        let name = self.steps[index].name.clone();
        warn!(
            run_id = %self.run_id,
            step = %name,
            kind = failure.kind,
            "Step failed, skipping dependents"
        );
        self.steps[index].state = StepState::Failed;
        self.steps[index].failure = Some(failure);
        self.state = RunState::Failed;
        self.skip_blocked_steps();
    }

    /// First pending step whose dependencies are all satisfied, in
    /// declaration order.
    fn next_ready_step(&self) -> Option<usize> {
        self.steps.iter().position(|step| {
            step.state == StepState::Pending
                && step.dependencies.iter().all(|dep| {
                    self.step(dep)
                        .is_some_and(|d| d.state.satisfies_dependencies())
                })
        })
    }

    /// Transition every pending step with a blocked dependency to
    /// Skipped, transitively.
    fn skip_blocked_steps(&mut self) {
        loop {
            let blocked: Vec<usize> = self
                .steps
                .iter()
                .enumerate()
                .filter(|(_, step)| {
                    step.state == StepState::Pending
                        && step.dependencies.iter().any(|dep| {
                            self.step(dep).is_some_and(|d| d.state.blocks_dependents())
                        })
                })
                .map(|(i, _)| i)
                .collect();

            if blocked.is_empty() {
                return;
            }
            for index in blocked {
                self.steps[index].state = StepState::Skipped;
                info!(run_id = %self.run_id, step = %self.steps[index].name, "Step skipped");
            }
        }
    }

    /// Transition every step still Pending to Skipped once the run has
    /// halted, covering branches independent of the failed step. A
    /// finished run never holds a non-terminal step state.
    fn skip_unstarted_steps(&mut self) {
        let run_id = self.run_id;
        for step in &mut self.steps {
            if step.state == StepState::Pending {
                step.state = StepState::Skipped;
                info!(run_id = %run_id, step = %step.name, "Step skipped");
            }
        }
    }

    fn validate_graph(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name.as_str()) {
                return Err(CoordinatorError::invariant(format!(
                    "duplicate step name: {}",
                    step.name
                )));
            }
        }

        for step in &self.steps {
            for dep in &step.dependencies {
                if !seen.contains(dep.as_str()) {
                    return Err(CoordinatorError::invariant(format!(
                        "step {} depends on unknown step {dep}",
                        step.name
                    )));
                }
            }
        }

        // Kahn's algorithm: leftover nodes mean a dependency cycle
        let mut remaining: HashMap<&str, HashSet<&str>> = self
            .steps
            .iter()
            .map(|s| {
                (
                    s.name.as_str(),
                    s.dependencies.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        loop {
            let free: Vec<&str> = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(name, _)| *name)
                .collect();
            if free.is_empty() {
                break;
            }
            for name in free {
                remaining.remove(name);
                for deps in remaining.values_mut() {
                    deps.remove(name);
                }
            }
        }
        if let Some(name) = remaining.keys().next() {
            return Err(CoordinatorError::invariant(format!(
                "dependency cycle involving step {name}"
            )));
        }

        Ok(())
    }
}
