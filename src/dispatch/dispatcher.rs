//! # Dispatcher
//!
//! Submits a built [`DispatchRequest`] through the injected
//! [`FleetManager`] capability and returns the acknowledgment.
//!
//! Submission is asynchronous from the standpoint of command execution:
//! a returned [`DispatchResult`] means one remote command is scheduled on
//! the named target. The dispatcher never retries a failed submission;
//! the scheduled side effect is not guaranteed idempotent, so resubmission
//! is a caller decision (the request's `client_token` exists for exactly
//! that case).

use std::sync::Arc;
use tracing::{error, info};

use crate::dispatch::fleet::FleetManager;
use crate::dispatch::types::{DispatchRequest, DispatchResult};
use crate::error::Result;

pub struct Dispatcher {
    fleet: Arc<dyn FleetManager>,
}

impl Dispatcher {
    pub fn new(fleet: Arc<dyn FleetManager>) -> Self {
        Self { fleet }
    }

    /// Submit one request and return the fleet manager's acknowledgment.
    pub async fn submit(&self, request: &DispatchRequest) -> Result<DispatchResult> {
        info!(
            target_id = %request.target_id,
            directive = %request.execution_directive,
            region = %request.region,
            backend = self.fleet.backend_name(),
            "Submitting command to fleet manager"
        );

        match self.fleet.submit(request).await {
            Ok(result) => {
                info!(
                    command_id = %result.command_id,
                    target_id = %request.target_id,
                    "Fleet manager accepted command"
                );
                Ok(result)
            }
            Err(err) => {
                error!(
                    target_id = %request.target_id,
                    backend = self.fleet.backend_name(),
                    error = %err,
                    "Submission failed (not retried)"
                );
                Err(err)
            }
        }
    }
}
