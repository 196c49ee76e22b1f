//! # Command Builder
//!
//! Pure transformation of validated parameters into a [`DispatchRequest`]
//! through a fixed field template. No network or I/O side effects.
//!
//! After precondition validation every template field must resolve; a
//! template referencing a field the parameter set does not know is an
//! internal invariant violation, not a user-facing error.

use uuid::Uuid;

use crate::config::DispatchParameters;
use crate::constants::params;
use crate::dispatch::types::DispatchRequest;
use crate::error::{CoordinatorError, Result};

/// Fixed mapping from request fields to the parameter names that feed
/// them. The default template is the identity mapping over the five
/// recognized options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    target_field: &'static str,
    payload_field: &'static str,
    directive_field: &'static str,
    log_sink_field: &'static str,
    region_field: &'static str,
}

impl Default for CommandTemplate {
    fn default() -> Self {
        Self {
            target_field: params::TARGET_ID,
            payload_field: params::PAYLOAD_URI,
            directive_field: params::EXECUTION_DIRECTIVE,
            log_sink_field: params::LOG_SINK,
            region_field: params::REGION,
        }
    }
}

impl CommandTemplate {
    /// Build a dispatch request from validated parameters.
    ///
    /// Pure and order-independent with respect to how the parameter map
    /// was assembled: the same parameters always yield a structurally
    /// equal request for the same `client_token`.
    pub fn build(
        &self,
        parameters: &DispatchParameters,
        client_token: Uuid,
    ) -> Result<DispatchRequest> {
        Ok(DispatchRequest {
            target_id: self.resolve(parameters, self.target_field)?,
            payload_uri: self.resolve(parameters, self.payload_field)?,
            execution_directive: self.resolve(parameters, self.directive_field)?,
            log_sink: self.resolve(parameters, self.log_sink_field)?,
            region: self.resolve(parameters, self.region_field)?,
            client_token,
        })
    }

    fn resolve(&self, parameters: &DispatchParameters, field: &str) -> Result<String> {
        parameters
            .get(field)
            .map(str::to_string)
            .ok_or_else(|| {
                CoordinatorError::invariant(format!(
                    "command template references unknown field: {field}"
                ))
            })
    }
}
