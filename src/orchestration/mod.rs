//! # Workflow Orchestration
//!
//! The state machine over named release steps and the coordinator that
//! wires validation, dispatch, and observation into the canonical
//! build -> upload -> dispatch -> observe sequence.

pub mod release;
pub mod states;
pub mod workflow;

pub use release::ReleaseCoordinator;
pub use states::{RunState, StepState};
pub use workflow::{StepContext, StepFailure, StepHandler, WorkflowRun};
