//! # campushub-observability
//!
//! Observability-Crate fuer CampusHub:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, HealthResponse, HealthState, HealthStatus};
pub use logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren};
pub use metrics::{metriken_antwort, CampusHubMetrics, LoginErgebnis};
pub use middleware::{request_timing_layer, timing_middleware};
