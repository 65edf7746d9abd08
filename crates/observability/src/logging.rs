//! Structured Logging Setup via tracing-subscriber
//!
//! Die Werte aus `[logging]` lassen sich per Umgebung ueberschreiben:
//! - `CH_LOG_LEVEL`: EnvFilter-Direktive (z.B. `info` oder `campushub_auth=debug`)
//! - `CH_LOG_FORMAT`: `text` oder `json`

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "CH_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "CH_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Umgebungsvariablen haben Vorrang vor den uebergebenen Werten. Ein
/// unlesbarer Filter faellt auf `info` zurueck. Ein zweiter Aufruf im
/// selben Prozess ist wirkungslos.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = format_waehlen(std::env::var(ENV_LOG_FORMAT).ok().as_deref(), format);

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    if ergebnis.is_err() {
        tracing::debug!("Logging war bereits initialisiert");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

fn format_waehlen(aus_env: Option<&str>, konfiguriert: &str) -> LogFormat {
    match aus_env.unwrap_or(konfiguriert) {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
///
/// Erlaubt ist ein nacktes Level oder eine EnvFilter-Direktive mit
/// Targets (`info,campushub_auth=debug`).
pub fn log_level_gueltig(level: &str) -> bool {
    if level.contains('=') || level.contains(',') {
        return EnvFilter::try_new(level).is_ok();
    }
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
