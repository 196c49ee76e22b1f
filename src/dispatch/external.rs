//! # Process-Backed Capabilities
//!
//! Production [`FleetManager`] and [`LogSink`] implementations that drive
//! the external command-line tools the operational workflow already uses.
//! The coordinator only ever sees the capability traits; which programs
//! run is configuration ([`crate::config::BackendConfig`]).
//!
//! Wire contract with the external tools:
//!
//! - submit: request fields are passed as `--flag value` pairs; stdout is
//!   JSON containing a `command_id` field
//! - query: sink and command id are passed as flags; stdout is JSON
//!   containing a `status` field in snake_case

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::BackendConfig;
use crate::dispatch::fleet::{FleetManager, LogSink};
use crate::dispatch::types::{DispatchRequest, DispatchResult, ExecutionStatus};
use crate::error::{CoordinatorError, Result};

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    command_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: ExecutionStatus,
}

/// Fleet manager backed by an external submit command.
pub struct ProcessFleetManager {
    program: String,
    args: Vec<String>,
}

impl ProcessFleetManager {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(backend: &BackendConfig) -> Self {
        Self::new(&backend.submit_program, backend.submit_args.clone())
    }
}

#[async_trait]
impl FleetManager for ProcessFleetManager {
    async fn submit(&self, request: &DispatchRequest) -> Result<DispatchResult> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--target-id")
            .arg(&request.target_id)
            .arg("--payload-uri")
            .arg(&request.payload_uri)
            .arg("--execution-directive")
            .arg(&request.execution_directive)
            .arg("--log-sink")
            .arg(&request.log_sink)
            .arg("--region")
            .arg(&request.region)
            .arg("--client-token")
            .arg(request.client_token.to_string())
            .output()
            .await
            .map_err(|e| {
                CoordinatorError::submission(
                    &request.target_id,
                    format!("failed to run {}: {e}", self.program),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoordinatorError::submission(
                &request.target_id,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        let response: SubmitResponse =
            serde_json::from_slice(&output.stdout).map_err(|e| {
                CoordinatorError::submission(
                    &request.target_id,
                    format!("unparseable response from {}: {e}", self.program),
                )
            })?;

        Ok(DispatchResult::new(response.command_id))
    }

    fn backend_name(&self) -> &'static str {
        "process"
    }
}

/// Log sink backed by an external status query command.
pub struct ProcessLogSink {
    program: String,
    args: Vec<String>,
}

impl ProcessLogSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(backend: &BackendConfig) -> Self {
        Self::new(&backend.query_program, backend.query_args.clone())
    }
}

#[async_trait]
impl LogSink for ProcessLogSink {
    async fn query(&self, sink: &str, command_id: &str) -> Result<ExecutionStatus> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--log-sink")
            .arg(sink)
            .arg("--command-id")
            .arg(command_id)
            .output()
            .await
            .map_err(|e| {
                CoordinatorError::poll(sink, format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoordinatorError::poll(
                sink,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        let response: QueryResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            CoordinatorError::poll(
                sink,
                format!("unparseable response from {}: {e}", self.program),
            )
        })?;

        Ok(response.status)
    }

    fn backend_name(&self) -> &'static str {
        "process"
    }
}
