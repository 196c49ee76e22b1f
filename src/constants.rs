//! # Coordinator Constants
//!
//! Canonical parameter keys, release step names, and poller defaults
//! shared across the coordinator.

/// Named parameters required for every dispatch.
///
/// The order of [`params::REQUIRED`] is the order precondition validation
/// checks them in, so the first missing key reported is deterministic.
pub mod params {
    pub const TARGET_ID: &str = "target_id";
    pub const PAYLOAD_URI: &str = "payload_uri";
    pub const EXECUTION_DIRECTIVE: &str = "execution_directive";
    pub const LOG_SINK: &str = "log_sink";
    pub const REGION: &str = "region";

    /// All required dispatch parameters, in validation order.
    pub const REQUIRED: [&str; 5] = [
        TARGET_ID,
        PAYLOAD_URI,
        EXECUTION_DIRECTIVE,
        LOG_SINK,
        REGION,
    ];
}

/// Canonical step names of a release run.
pub mod steps {
    pub const BUILD: &str = "build";
    pub const UPLOAD: &str = "upload";
    pub const DISPATCH: &str = "dispatch";
    pub const OBSERVE: &str = "observe";
}

/// Poller defaults, overridable through [`crate::config::CoordinatorConfig`].
pub mod defaults {
    /// Delay between consecutive log sink polls in follow mode.
    pub const POLL_INTERVAL_MS: u64 = 2_000;

    /// Upper bound on a follow-mode wait before returning `TimedOut`.
    pub const FOLLOW_TIMEOUT_SECS: u64 = 600;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_params_complete_and_ordered() {
        assert_eq!(params::REQUIRED.len(), 5);
        assert_eq!(params::REQUIRED[0], params::TARGET_ID);
        assert_eq!(params::REQUIRED[4], params::REGION);
    }
}
