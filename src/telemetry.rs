//! Logging initialization.
//!
//! Output goes to stderr so stdout stays clean for `--json` reports.
//! - `RUST_LOG` selects the filter; otherwise `info`, or `debug` with
//!   `--verbose`
//! - `XPLAT_LOG_FORMAT=json` switches to JSON lines with span close events

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format
pub const LOG_FORMAT_ENV: &str = "XPLAT_LOG_FORMAT";

/// Install the global subscriber. Calling it twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init(verbose: bool) {
    let filter = default_filter(verbose);
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "subscriber already installed");
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(verbose))
}

fn fallback_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}
