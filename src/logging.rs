//! # Structured Logging Module
//!
//! Env-filter controlled structured logging for the coordinator. Durable
//! execution history lives in the external log sink, not here; this output
//! exists so each dispatch, poll transition, and step state change is
//! actionable from a single log line.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging exactly once.
///
/// Honors `RUST_LOG` when set, defaulting to `info`. Safe to call from
/// both the library and the CLI; a pre-existing global subscriber (set by
/// an embedding application) is left in place.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter),
        );

        // try_init so an embedding application's subscriber wins
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
