//! # Coordinator Configuration
//!
//! Explicit, validated configuration with no ambient global state. The
//! coordinator never reads process environment variables itself; callers
//! snapshot whatever environment-style inputs they have into an explicit
//! map and build a [`DispatchParameters`] from it.
//!
//! Two layers:
//!
//! - [`DispatchParameters`]: the five recognized options of a single
//!   dispatch (target, payload location, execution directive, log sink,
//!   region), constructed only through precondition validation.
//! - [`CoordinatorConfig`]: operational settings (poll cadence, follow
//!   timeout, external backend commands) loaded from an optional TOML
//!   file with explicit defaults.

use crate::constants::{defaults, params};
use crate::error::{CoordinatorError, Result};
use crate::validation;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// The validated parameter set of one dispatch.
///
/// Construction via [`DispatchParameters::from_map`] is the only path, so
/// holding a value of this type means every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchParameters {
    /// Identity of the fleet-managed node the command is for.
    pub target_id: String,
    /// Object store location of the payload artifact.
    pub payload_uri: String,
    /// Identifier of the playbook/script the node should execute.
    pub execution_directive: String,
    /// Destination the node's execution output is written to.
    pub log_sink: String,
    /// Region/zone the target and its fleet manager live in.
    pub region: String,
}

impl DispatchParameters {
    /// Build validated parameters from an explicit named-parameter map.
    ///
    /// Fails fast with `MissingParameter` naming the first required key
    /// (in [`params::REQUIRED`] order) that is absent or empty. Accepted
    /// values are stored with surrounding whitespace stripped.
    pub fn from_map(input: &HashMap<String, String>) -> Result<Self> {
        validation::validate_required(input, &params::REQUIRED)?;

        Ok(Self {
            target_id: validation::require(input, params::TARGET_ID)?.to_string(),
            payload_uri: validation::require(input, params::PAYLOAD_URI)?.to_string(),
            execution_directive: validation::require(input, params::EXECUTION_DIRECTIVE)?
                .to_string(),
            log_sink: validation::require(input, params::LOG_SINK)?.to_string(),
            region: validation::require(input, params::REGION)?.to_string(),
        })
    }

    /// Field lookup by canonical parameter name, for template resolution.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            params::TARGET_ID => Some(&self.target_id),
            params::PAYLOAD_URI => Some(&self.payload_uri),
            params::EXECUTION_DIRECTIVE => Some(&self.execution_directive),
            params::LOG_SINK => Some(&self.log_sink),
            params::REGION => Some(&self.region),
            _ => None,
        }
    }
}

/// External command backends used by the process-backed capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Program invoked to submit a command to the fleet manager.
    pub submit_program: String,
    /// Leading arguments passed to the submit program.
    pub submit_args: Vec<String>,
    /// Program invoked to query the log sink for command status.
    pub query_program: String,
    /// Leading arguments passed to the query program.
    pub query_args: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            submit_program: "fleetctl".to_string(),
            submit_args: vec!["send-command".to_string()],
            query_program: "fleetctl".to_string(),
            query_args: vec!["command-status".to_string()],
        }
    }
}

/// Operational settings of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Delay between consecutive log sink polls in follow mode.
    pub poll_interval_ms: u64,
    /// Upper bound on a follow-mode wait before reporting `TimedOut`.
    pub follow_timeout_secs: u64,
    /// External backend commands for the process-backed capabilities.
    pub backend: BackendConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            follow_timeout_secs: defaults::FOLLOW_TIMEOUT_SECS,
            backend: BackendConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from an optional TOML file over explicit
    /// defaults. A missing `path` yields pure defaults; a present but
    /// unreadable or malformed file is a configuration error, never a
    /// silent fallback.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("poll_interval_ms", defaults::POLL_INTERVAL_MS)
            .and_then(|b| b.set_default("follow_timeout_secs", defaults::FOLLOW_TIMEOUT_SECS))
            .and_then(|b| b.set_default("backend.submit_program", "fleetctl"))
            .and_then(|b| b.set_default("backend.submit_args", vec!["send-command".to_string()]))
            .and_then(|b| b.set_default("backend.query_program", "fleetctl"))
            .and_then(|b| b.set_default("backend.query_args", vec!["command-status".to_string()]))
            .map_err(|e| CoordinatorError::configuration("defaults", e.to_string()))?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| CoordinatorError::configuration("coordinator", e.to_string()))
    }

    /// Poll cadence as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Follow-mode timeout as a [`Duration`].
    pub fn follow_timeout(&self) -> Duration {
        Duration::from_secs(self.follow_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn complete_map() -> HashMap<String, String> {
        HashMap::from([
            (params::TARGET_ID.to_string(), "node-7".to_string()),
            (params::PAYLOAD_URI.to_string(), "store://rel/app.tar".to_string()),
            (params::EXECUTION_DIRECTIVE.to_string(), "deploy-app".to_string()),
            (params::LOG_SINK.to_string(), "deploy-log".to_string()),
            (params::REGION.to_string(), "eu-central-1".to_string()),
        ])
    }

    #[test]
    fn test_from_map_builds_validated_parameters() {
        let parameters = DispatchParameters::from_map(&complete_map()).unwrap();
        assert_eq!(parameters.target_id, "node-7");
        assert_eq!(parameters.get(params::REGION), Some("eu-central-1"));
        assert_eq!(parameters.get("unknown_field"), None);
    }

    #[test]
    fn test_from_map_strips_padding_from_values() {
        let mut input = complete_map();
        input.insert(params::TARGET_ID.to_string(), " node-7 ".to_string());
        input.insert(params::REGION.to_string(), "eu-central-1\n".to_string());

        let parameters = DispatchParameters::from_map(&input).unwrap();
        assert_eq!(parameters.target_id, "node-7");
        assert_eq!(parameters.region, "eu-central-1");
    }

    #[test]
    fn test_from_map_rejects_missing_key() {
        let mut input = complete_map();
        input.remove(params::LOG_SINK);
        let err = DispatchParameters::from_map(&input).unwrap_err();
        assert_eq!(err.kind(), "missing_parameter");
    }

    #[test]
    fn test_config_defaults_without_file() {
        let config = CoordinatorConfig::load(None).unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(2_000));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "poll_interval_ms = 250").unwrap();
        writeln!(file, "[backend]").unwrap();
        writeln!(file, "submit_program = \"aws\"").unwrap();
        writeln!(file, "submit_args = [\"ssm\", \"send-command\"]").unwrap();

        let config = CoordinatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.backend.submit_program, "aws");
        // untouched keys keep their defaults
        assert_eq!(config.follow_timeout_secs, defaults::FOLLOW_TIMEOUT_SECS);
    }
}
