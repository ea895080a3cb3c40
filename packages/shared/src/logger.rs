//! Logging setup for the liverelay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The default filter enables `default_log_level` for the liverelay crates and the
/// calling binary. `RUST_LOG` overrides it entirely.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "liverelay-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use liverelay_shared::logger::setup_logger;
///
/// setup_logger("liverelay-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Route panics through `tracing` so a crashed task shows up in the relay log.
///
/// Tokio already isolates a panicking task from the rest of the runtime; this hook only
/// makes sure the fault is recorded with its location instead of going to bare stderr.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        tracing::error!(%location, "Unexpected internal fault (isolated): {}", payload);
    }));
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "liverelay_shared={level},liverelay_server={level},liverelay_client={level},{bin}={level},tower_http=info",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}
