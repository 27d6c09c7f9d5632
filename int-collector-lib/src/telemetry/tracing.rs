use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::decode::TRACE_TARGET;
use crate::error::{CollectorError, Result};

/// Install the global subscriber: an `EnvFilter` plus a fmt layer.
///
/// `RUST_LOG` takes precedence over the configured levels. With
/// `diagnostic_trace` on, per-field decode events on
/// `int_collector::trace` are enabled on top of either.
pub fn init_tracing(
    log_level: &str,
    show_target: bool,
    otel_log_level: &str,
    diagnostic_trace: bool,
) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => with_decode_trace(filter, diagnostic_trace)?,
        Err(_) => build_env_filter(log_level, otel_log_level, diagnostic_trace)?,
    };
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(show_target);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        CollectorError::Telemetry(format!("Failed to set global tracing subscriber: {e}"))
    })
}

/// Filter for the configured levels, ignoring `RUST_LOG`.
pub fn build_env_filter(
    log_level: &str,
    otel_log_level: &str,
    diagnostic_trace: bool,
) -> Result<EnvFilter> {
    let filter = EnvFilter::try_new(format!("{log_level},opentelemetry={otel_log_level}"))
        .map_err(|e| CollectorError::Telemetry(format!("Invalid log level: {e}")))?;
    with_decode_trace(filter, diagnostic_trace)
}

fn with_decode_trace(filter: EnvFilter, diagnostic_trace: bool) -> Result<EnvFilter> {
    if !diagnostic_trace {
        return Ok(filter);
    }
    let directive: Directive = format!("{TRACE_TARGET}=debug")
        .parse()
        .map_err(|e| CollectorError::Telemetry(format!("Invalid trace directive: {e}")))?;
    Ok(filter.add_directive(directive))
}
