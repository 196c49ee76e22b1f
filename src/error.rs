//! # Coordinator Error Types
//!
//! Structured error handling for the dispatch coordinator using thiserror
//! for typed errors instead of `Box<dyn Error>` patterns.
//!
//! None of these errors are retried internally. The remote side effect of a
//! dispatch (installing or restarting a service on a fleet node) is not
//! guaranteed idempotent, so retry and backoff policy belongs to the caller.

use std::time::Duration;
use thiserror::Error;

/// Error taxonomy for the dispatch coordinator.
///
/// Every variant carries enough context (parameter key, command id, sink)
/// to be actionable from a single log line.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Missing required parameter: {key}")]
    MissingParameter { key: String },

    #[error("Submission failed for target {target}: {message}")]
    SubmissionError { target: String, message: String },

    #[error("Log sink query failed: {sink}: {message}")]
    PollError { sink: String, message: String },

    #[error("Timed out after {waited:?} waiting for command {command_id}")]
    TimedOut { command_id: String, waited: Duration },

    #[error("Cancelled while waiting for command {command_id}")]
    Cancelled { command_id: String },

    #[error("Command {command_id} reported as failed by sink {sink}")]
    CommandFailed { command_id: String, sink: String },

    #[error("Internal invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },
}

impl CoordinatorError {
    /// Create a missing parameter error
    pub fn missing_parameter(key: impl Into<String>) -> Self {
        Self::MissingParameter { key: key.into() }
    }

    /// Create a submission error
    pub fn submission(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubmissionError {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a poll error
    pub fn poll(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PollError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timed_out(command_id: impl Into<String>, waited: Duration) -> Self {
        Self::TimedOut {
            command_id: command_id.into(),
            waited,
        }
    }

    /// Create a cancellation error
    pub fn cancelled(command_id: impl Into<String>) -> Self {
        Self::Cancelled {
            command_id: command_id.into(),
        }
    }

    /// Create a remote command failure error
    pub fn command_failed(command_id: impl Into<String>, sink: impl Into<String>) -> Self {
        Self::CommandFailed {
            command_id: command_id.into(),
            sink: sink.into(),
        }
    }

    /// Create an internal invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Short stable name of the error kind, used when a failed workflow
    /// step must name what halted it.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "missing_parameter",
            Self::SubmissionError { .. } => "submission_error",
            Self::PollError { .. } => "poll_error",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled { .. } => "cancelled",
            Self::CommandFailed { .. } => "command_failed",
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::Configuration { .. } => "configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
