//! Tracing and metrics bootstrap.

use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static DESCRIBE_ONCE: Once = Once::new();

/// Install the global tracing subscriber and register metric descriptions.
/// Call once at startup; a second install fails.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    DESCRIBE_ONCE.call_once(describe_metrics);

    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let installed = match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(true))
            .try_init(),
    };

    installed
        .map_err(|err| InfraError::telemetry(format!("tracing subscriber install failed: {err}")))
}

fn describe_metrics() {
    describe_counter!(
        "vetrina_cache_hit_total",
        Unit::Count,
        "Query-cache reads served from a fresh entry."
    );
    describe_counter!(
        "vetrina_cache_miss_total",
        Unit::Count,
        "Query-cache reads sent to the store (cold, stale, or expired entry)."
    );
    describe_counter!(
        "vetrina_cache_invalidated_total",
        Unit::Count,
        "Cache entries marked stale by collection-tag invalidation."
    );
    describe_counter!(
        "vetrina_form_rate_limited_total",
        Unit::Count,
        "Form submissions rejected by the fixed-window throttle."
    );
}
