//! # Fleet Capabilities
//!
//! The coordinator's boundary to the outside world: an injected fleet
//! manager that schedules commands, and an injected log sink that exposes
//! their out-of-band status. External tools (cloud CLIs, in-memory fakes)
//! live behind these traits so the coordinator is testable without
//! touching real processes.
//!
//! There is no ordering or delivery guarantee between submission
//! acknowledgment and log sink visibility; the two sides are joined only
//! by the opaque command identifier.

use async_trait::async_trait;

use crate::dispatch::types::{DispatchRequest, DispatchResult, ExecutionStatus};
use crate::error::Result;

/// Capability to submit commands to a remote execution fleet-management
/// facility.
#[async_trait]
pub trait FleetManager: Send + Sync {
    /// Submit a request for asynchronous execution.
    ///
    /// Success means the fleet manager accepted and scheduled the
    /// request, never that the remote action completed. Errors surface as
    /// `SubmissionError`; implementations must not retry internally.
    async fn submit(&self, request: &DispatchRequest) -> Result<DispatchResult>;

    /// Backend name for identification in logs.
    fn backend_name(&self) -> &'static str;
}

/// Capability to read a command's execution status from an external,
/// append-only log sink.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Query the current best-known status of a command.
    ///
    /// A pure read of remote state; must not mutate anything. Errors
    /// surface as `PollError`. Implementations map the sink's latest
    /// entries to terminal/non-terminal markers only; deeper log parsing
    /// belongs to the caller.
    async fn query(&self, sink: &str, command_id: &str) -> Result<ExecutionStatus>;

    /// Backend name for identification in logs.
    fn backend_name(&self) -> &'static str;
}
