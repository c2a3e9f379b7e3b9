use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, which writes events to stderr.
///
/// Filtering follows `RUST_LOG`, and defaults to `info` when it is not set.
/// Does nothing if a subscriber has already been installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber was already installed");
    }
}
