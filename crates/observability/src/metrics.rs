//! Prometheus-kompatible Metriken fuer CampusHub
//!
//! Registrierte Metriken:
//! - `campushub_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `campushub_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit
//! - `campushub_logins_total` – Counter: Login-Versuche nach Ergebnis
//! - `campushub_profile_cache_hits_total` – Counter: Profil-Cache-Treffer
//! - `campushub_profile_cache_misses_total` – Counter: Profil-Cache-Fehlgriffe

use anyhow::Result;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Ausgang eines Login-Versuchs (Label `ergebnis`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginErgebnis {
    Erfolg,
    UngueltigeAnmeldedaten,
    Gebannt,
    Gesperrt,
    Fehler,
}

impl LoginErgebnis {
    pub fn label(self) -> &'static str {
        match self {
            Self::Erfolg => "erfolg",
            Self::UngueltigeAnmeldedaten => "ungueltig",
            Self::Gebannt => "gebannt",
            Self::Gesperrt => "gesperrt",
            Self::Fehler => "fehler",
        }
    }
}

/// Alle CampusHub-Prometheus-Metriken
#[derive(Clone)]
pub struct CampusHubMetrics {
    pub registry: Arc<Registry>,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Auth-Metriken
    pub logins_total: IntCounterVec,
    pub profil_cache_treffer: IntCounter,
    pub profil_cache_fehlgriffe: IntCounter,
}

impl CampusHubMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("campushub_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "campushub_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            // Argon2-Logins liegen deutlich ueber den uebrigen Anfragen
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let logins_total = IntCounterVec::new(
            Opts::new("campushub_logins_total", "Login-Versuche nach Ergebnis"),
            &["ergebnis"],
        )?;
        registry.register(Box::new(logins_total.clone()))?;

        let profil_cache_treffer = IntCounter::with_opts(Opts::new(
            "campushub_profile_cache_hits_total",
            "Aus dem Cache beantwortete Profilanfragen",
        ))?;
        registry.register(Box::new(profil_cache_treffer.clone()))?;

        let profil_cache_fehlgriffe = IntCounter::with_opts(Opts::new(
            "campushub_profile_cache_misses_total",
            "Profilanfragen mit Datenbankzugriff",
        ))?;
        registry.register(Box::new(profil_cache_fehlgriffe.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            http_requests_total,
            http_request_duration_seconds,
            logins_total,
            profil_cache_treffer,
            profil_cache_fehlgriffe,
        })
    }

    pub fn login_zaehlen(&self, ergebnis: LoginErgebnis) {
        self.logins_total
            .with_label_values(&[ergebnis.label()])
            .inc();
    }

    /// Zieht die Cache-Counter auf die Zaehlerstaende des Profil-Caches nach
    ///
    /// Der Cache zaehlt selbst; hier wird nur die Differenz addiert, damit
    /// die Counter monoton bleiben.
    pub fn cache_zaehler_angleichen(&self, treffer: u64, fehlgriffe: u64) {
        let bisher = self.profil_cache_treffer.get();
        if treffer > bisher {
            self.profil_cache_treffer.inc_by(treffer - bisher);
        }
        let bisher = self.profil_cache_fehlgriffe.get();
        if fehlgriffe > bisher {
            self.profil_cache_fehlgriffe.inc_by(fehlgriffe - bisher);
        }
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Baut die `/metrics`-Antwort im Prometheus-Textformat
pub fn metriken_antwort(metriken: &CampusHubMetrics) -> Response {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
