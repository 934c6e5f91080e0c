use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use workbench_core::WORKBENCH_LOG_VAR;

// Re-export tracing macros for convenience
pub use ::tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system
///
/// The filter comes from `WORKBENCH_LOG` when set, otherwise from
/// `default_level`. Output goes to stderr so command output on stdout stays
/// machine readable; ANSI colours are only used on a TTY.
pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = build_filter(default_level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn build_filter(default_level: &str) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_from_env(WORKBENCH_LOG_VAR).or_else(|_| EnvFilter::try_new(default_level))
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Span covering everything done on behalf of one open file
pub fn file_span(path: &str) -> Span {
    span!(Level::INFO, "file", path = %path)
}

/// Span covering one execution output group
pub fn group_span(group_id: &str) -> Span {
    span!(Level::DEBUG, "execution_group", group_id = %group_id)
}

/// Emit a structured event for cache operations
pub fn cache_event(key: &str, hit: bool, operation: &str) {
    if hit {
        debug!(key = %key, operation = %operation, "cache_hit");
    } else {
        debug!(key = %key, operation = %operation, "cache_miss");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_default_level() {
        assert!(build_filter("debug").is_ok());
    }
}
