//! Logging setup utilities for the ClusterTalk packages.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Library crates whose log output is enabled alongside the binary.
const LIBRARY_TARGETS: &[&str] = &["clustertalk_client", "clustertalk_shared"];

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Binary names use hyphens while tracing targets use the crate name,
/// so hyphens are normalized to underscores.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut directives: Vec<String> = LIBRARY_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect();

    if !LIBRARY_TARGETS.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }

    directives.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "clustertalk-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use clustertalk_shared::logger::setup_logger;
///
/// setup_logger("clustertalk-client", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
