// DANS : src/monitoring/logging.rs
use tracing_subscriber::EnvFilter;

/// Initialise le subscriber `tracing`.
///
/// `RUST_LOG` reste prioritaire s'il est défini. Sinon on utilise `LOG_LEVEL`
/// (debug/info/warn/error). Les valeurs inconnues retombent sur "info".
pub fn setup_logging(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(normalize_level(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    // `try_init` : un second appel (tests, analyse puis scan) ne doit pas paniquer.
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

pub fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}
