/*!
 * Tracing Setup
 * Structured logging for namespace and session operations
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Operations slower than this are reported at `warn`
const SLOW_OPERATION: Duration = Duration::from_millis(50);

/// Install the global subscriber
///
/// The filter comes from `RUST_LOG` (default: info). `json` switches from the
/// compact human formatter to JSON lines. Calling this twice is harmless.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json, "Tracing initialized");
    }
}

/// Timed span around one logical operation
///
/// The duration is recorded and logged when the span is dropped.
pub struct OperationSpan {
    span: Span,
    start: Instant,
    name: String,
}

impl OperationSpan {
    pub fn new(name: &str) -> Self {
        let span = span!(
            Level::DEBUG,
            "operation",
            operation = name,
            duration_us = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.span.record("outcome", outcome);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.span.record("duration_us", elapsed.as_micros() as u64);
        let _entered = self.span.enter();

        if elapsed > SLOW_OPERATION {
            warn!(
                operation = %self.name,
                duration_ms = elapsed.as_millis() as u64,
                slow = true,
                "slow operation"
            );
        } else {
            debug!(operation = %self.name, duration_us = elapsed.as_micros() as u64, "operation completed");
        }
    }
}

/// Start a timed operation span
#[inline]
pub fn span_operation(name: &str) -> OperationSpan {
    OperationSpan::new(name)
}
