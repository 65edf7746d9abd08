//! Axum HTTP-Server fuer die CampusHub-API

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};

use campushub_db::Datenbank;
use campushub_observability::{request_timing_layer, timing_middleware};

use crate::{routes::api_router, state::ApiState};

/// REST-Server-Konfiguration
#[derive(Debug, Clone)]
pub struct ApiServerKonfig {
    pub bind_addr: SocketAddr,
    /// Erlaubte CORS-Origins. Leer = alle Origins erlaubt (nur fuer Entwicklung).
    pub cors_origins: Vec<String>,
    /// Stellt `/metrics` bereit
    pub metriken_aktiviert: bool,
}

impl Default for ApiServerKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_origins: vec![],
            metriken_aktiviert: true,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// Vollstaendige Anwendung mit Timing, Tracing und CORS
pub fn app<R: Datenbank>(state: ApiState<R>, konfig: &ApiServerKonfig) -> Router {
    let metriken = state.metriken.clone();

    api_router(state, konfig.metriken_aktiviert)
        .layer(middleware::from_fn_with_state(metriken, timing_middleware))
        .layer(request_timing_layer())
        .layer(cors_layer(&konfig.cors_origins))
}

pub struct ApiServer {
    konfig: ApiServerKonfig,
}

impl ApiServer {
    pub fn neu(konfig: ApiServerKonfig) -> Self {
        Self { konfig }
    }

    /// Startet den Server und laeuft bis `shutdown` fertig ist
    pub async fn starten<R, F>(self, state: ApiState<R>, shutdown: F) -> Result<()>
    where
        R: Datenbank,
        F: Future<Output = ()> + Send + 'static,
    {
        let app = app(state, &self.konfig);

        let listener = tokio::net::TcpListener::bind(self.konfig.bind_addr).await?;
        tracing::info!(addr = %self.konfig.bind_addr, "REST-API gestartet");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
