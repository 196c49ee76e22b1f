#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fleet Dispatch
//!
//! A thin coordinator for no-SSH remote command dispatch: validated
//! submission of commands to a fleet-management facility, with
//! asynchronous execution observed out-of-band through an external log
//! sink.
//!
//! ## Overview
//!
//! Fleet-managed nodes are reachable only through an intermediary
//! command-dispatch facility, never by direct interactive connection.
//! Submitting a command and learning its outcome are therefore two
//! decoupled operations joined only by an opaque command identifier:
//! submit to the fleet manager, then separately poll the log sink the
//! node's execution output is written to.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌────────────┐   ┌───────────────┐
//! │ Orchestrator │──▶│ Validator │──▶│  Builder   │──▶│  Dispatcher   │
//! │ (release run)│   │ fail-fast │   │ (template) │   │ (async submit)│
//! └──────┬───────┘   └───────────┘   └────────────┘   └───────┬───────┘
//!        │                                                    ▼
//!        │           ┌───────────────┐              [external fleet
//!        └──────────▶│ Status Poller │◀──────────── executes command,
//!          terminal  │ (follow mode) │   log sink   writes to sink]
//!          report    └───────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Explicit dispatch parameters and operational settings
//! - [`validation`] - Fail-fast precondition validation
//! - [`dispatch`] - Command builder, capabilities, dispatcher, poller
//! - [`orchestration`] - Workflow run state machine and release coordinator
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging bootstrap
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fleet_dispatch::config::{CoordinatorConfig, DispatchParameters};
//! use fleet_dispatch::dispatch::{ProcessFleetManager, ProcessLogSink};
//! use fleet_dispatch::orchestration::ReleaseCoordinator;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # async fn example(input: HashMap<String, String>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoordinatorConfig::load(None)?;
//! let coordinator = ReleaseCoordinator::new(
//!     Arc::new(ProcessFleetManager::from_config(&config.backend)),
//!     Arc::new(ProcessLogSink::from_config(&config.backend)),
//!     config,
//! );
//!
//! let params = DispatchParameters::from_map(&input)?;
//! let result = coordinator.dispatch_only(&params).await?;
//! println!("command accepted: {}", result.command_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## What this coordinator does not do
//!
//! No internal retries (the remote side effect is not guaranteed
//! idempotent), no persistence of run history (the log sink is the
//! durable record), and no mutual exclusion across concurrent releases
//! of the same target (caller policy).

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod orchestration;
pub mod validation;

pub use config::{BackendConfig, CoordinatorConfig, DispatchParameters};
pub use dispatch::{
    CancellationHandle, CommandTemplate, DispatchRequest, DispatchResult, Dispatcher,
    ExecutionStatus, FleetManager, LogSink, StatusPoller,
};
pub use error::{CoordinatorError, Result};
pub use orchestration::{
    ReleaseCoordinator, RunState, StepContext, StepFailure, StepHandler, StepState, WorkflowRun,
};
