use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes structured logging using `tracing-subscriber`.
///
/// Verbosity follows `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_thread_ids(true)
        .init();
}
