//! # Dispatch Types
//!
//! Core data types shared across the dispatch path: the structured remote
//! command request, the submission acknowledgment, and the remotely
//! observed execution status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{CoordinatorError, Result};

/// A structured remote command request, ready for submission to a fleet
/// manager.
///
/// All core fields are non-empty by construction: requests are produced
/// only by the command builder from validated parameters. The
/// `client_token` is a client-side idempotency key generated once per
/// release attempt and reused if the caller resubmits that attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub target_id: String,
    pub payload_uri: String,
    pub execution_directive: String,
    pub log_sink: String,
    pub region: String,
    pub client_token: Uuid,
}

impl DispatchRequest {
    /// Serialize to the wire/template form handed to a fleet backend.
    pub fn to_wire(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CoordinatorError::invariant(format!("request serialization: {e}")))
    }

    /// Parse a request back from its wire form.
    pub fn from_wire(wire: &str) -> Result<Self> {
        serde_json::from_str(wire)
            .map_err(|e| CoordinatorError::invariant(format!("request deserialization: {e}")))
    }
}

/// Acknowledgment of a successful submission.
///
/// Created only after the fleet manager accepted the request; immutable
/// thereafter. Acceptance means "scheduled", never "completed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Opaque command identifier assigned by the fleet manager.
    pub command_id: String,
    /// When the fleet manager acknowledged the submission.
    pub submitted_at: DateTime<Utc>,
}

impl DispatchResult {
    pub fn new(command_id: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Remotely observed execution status of a dispatched command.
///
/// Mutated only by status observation of the external log sink; the
/// dispatcher never sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Accepted by the fleet manager, not yet visible in the log sink
    Pending,
    /// The node is executing the command
    InProgress,
    /// Terminal: the command completed successfully
    Succeeded,
    /// Terminal: the command failed on the node
    Failed,
    /// Terminal from the observer's standpoint: the follow window elapsed
    TimedOut,
}

impl ExecutionStatus {
    /// Whether observation can stop at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }

    /// Whether the remote command is known to have finished successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::TimedOut => write!(f, "timed_out"),
        }
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "timed_out" => Ok(Self::TimedOut),
            _ => Err(format!("Invalid execution status: {s}")),
        }
    }
}
