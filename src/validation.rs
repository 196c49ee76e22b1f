//! # Precondition Validation
//!
//! Fail-fast validation of named dispatch parameters before any remote
//! action is attempted. Mirrors the operational rule this coordinator was
//! built around: one check fails, report exactly which one, stop.
//!
//! Validation is pure and deterministic: the required keys are checked in
//! a fixed order, so the same input always reports the same first
//! offending key regardless of map iteration order.

use crate::error::{CoordinatorError, Result};
use std::collections::HashMap;

/// Look up a single required key, failing with `MissingParameter` when the
/// key is absent or its value is empty (after trimming).
///
/// The accepted value is returned with surrounding whitespace stripped,
/// so padded inputs never reach the wire verbatim.
pub fn require<'a>(params: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    match params.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim()),
        _ => Err(CoordinatorError::missing_parameter(key)),
    }
}

/// Validate that every required key is present and non-empty.
///
/// Fails fast: the first missing key in `required` order is the one named
/// in the error, and no further keys are inspected. No side effects.
pub fn validate_required(params: &HashMap<String, String>, required: &[&str]) -> Result<()> {
    for key in required {
        require(params, key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::params;

    fn complete_params() -> HashMap<String, String> {
        params::REQUIRED
            .iter()
            .map(|key| (key.to_string(), format!("value-for-{key}")))
            .collect()
    }

    #[test]
    fn test_complete_params_pass() {
        assert!(validate_required(&complete_params(), &params::REQUIRED).is_ok());
    }

    #[test]
    fn test_each_missing_key_is_named() {
        for missing in params::REQUIRED {
            let mut input = complete_params();
            input.remove(missing);

            let err = validate_required(&input, &params::REQUIRED).unwrap_err();
            match err {
                CoordinatorError::MissingParameter { key } => assert_eq!(key, missing),
                other => panic!("expected MissingParameter, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut input = complete_params();
        input.insert(params::REGION.to_string(), "   ".to_string());

        let err = validate_required(&input, &params::REQUIRED).unwrap_err();
        match err {
            CoordinatorError::MissingParameter { key } => assert_eq!(key, params::REGION),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_padded_value_is_accepted_trimmed() {
        let mut input = complete_params();
        input.insert(params::TARGET_ID.to_string(), "  node-7 ".to_string());

        assert_eq!(require(&input, params::TARGET_ID).unwrap(), "node-7");
    }

    #[test]
    fn test_first_missing_key_wins() {
        let mut input = complete_params();
        input.remove(params::PAYLOAD_URI);
        input.remove(params::LOG_SINK);

        // payload_uri precedes log_sink in the canonical order
        let err = validate_required(&input, &params::REQUIRED).unwrap_err();
        match err {
            CoordinatorError::MissingParameter { key } => assert_eq!(key, params::PAYLOAD_URI),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }
}
