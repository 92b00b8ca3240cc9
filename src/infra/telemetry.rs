use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Register descriptions for every metric the crate emits.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "hotelier_cache_hit_total",
            Unit::Count,
            "Total number of reads served from a live cache entry."
        );
        describe_counter!(
            "hotelier_cache_miss_total",
            Unit::Count,
            "Total number of reads that fell through to the backing store."
        );
        describe_counter!(
            "hotelier_cache_not_found_total",
            Unit::Count,
            "Total number of misses where the backing store had nothing to cache."
        );
        describe_counter!(
            "hotelier_cache_expired_total",
            Unit::Count,
            "Total number of entries dropped on read after their TTL elapsed."
        );
        describe_counter!(
            "hotelier_cache_evict_total",
            Unit::Count,
            "Total number of cache evictions due to capacity."
        );
        describe_counter!(
            "hotelier_cache_invalidate_total",
            Unit::Count,
            "Total number of entries removed after a mutation."
        );
        describe_counter!(
            "hotelier_cache_store_error_total",
            Unit::Count,
            "Total number of cache store operations that failed and were skipped."
        );
    });
}
