use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "info,chirpy=debug,sqlx=warn";

/// Build the filter from `RUST_LOG`, falling back to `DEFAULT_DIRECTIVES`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global JSON subscriber.
///
/// `log` records from actix and sqlx are forwarded into the same pipeline.
/// Calling this twice is harmless; the second subscriber is discarded.
pub fn init_telemetry() {
    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json()
        .with_current_span(false);

    if tracing_subscriber::registry()
        .with(env_filter())
        .with(formatting_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Telemetry already initialised");
    }
}
