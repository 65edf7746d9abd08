//! campushub-server – Bibliotheks-Root
//!
//! Verdrahtet Store, Auth-Dienste und REST-API anhand der Konfiguration.

pub mod config;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

use campushub_api::{db_ueberwachung_starten, ApiServer, ApiServerKonfig, ApiState};
use campushub_auth::{AuthError, ResetStore, TokenDienst};
use campushub_core::{SystemUhr, Uhr};
use campushub_db::{DatabaseBackend, Datenbank, MemoryDb, SqliteDb};
use campushub_observability::CampusHubMetrics;

use config::{ServerConfig, ENV_JWT_SECRET};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Subsysteme und laeuft bis Ctrl-C
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen (inkl. Migrationen)
    /// 2. Token-Dienst und Reset-Store aufbauen, Cleanup-Task starten
    /// 3. DB-Ueberwachung fuer `/health` starten
    /// 4. Optional Start-Admin anlegen
    /// 5. REST-API starten
    pub async fn starten(self) -> Result<()> {
        let db_config = self.config.datenbank_config()?;
        tracing::info!(
            backend = %db_config.backend,
            url = %db_config.url,
            "Datenbankverbindung wird hergestellt"
        );

        let uhr: Arc<dyn Uhr> = Arc::new(SystemUhr);
        match db_config.backend {
            DatabaseBackend::Memory => {
                tracing::warn!("In-Memory-Backend aktiv: Konten gehen beim Beenden verloren");
                self.laufen(Arc::new(MemoryDb::mit_uhr(uhr.clone())), uhr).await
            }
            DatabaseBackend::Sqlite => {
                let db = SqliteDb::oeffnen(&db_config)
                    .await
                    .context("SQLite konnte nicht geoeffnet werden")?
                    .mit_uhr(uhr.clone());
                self.laufen(Arc::new(db), uhr).await
            }
        }
    }

    async fn laufen<R: Datenbank>(self, repo: Arc<R>, uhr: Arc<dyn Uhr>) -> Result<()> {
        let secret = self.config.jwt_secret(std::env::var(ENV_JWT_SECRET).ok())?;
        let auth = &self.config.auth;

        let token_dienst = Arc::new(TokenDienst::neu(
            secret.as_bytes(),
            Duration::hours(auth.token_lebensdauer_stunden),
            uhr.clone(),
        )?);
        let reset_store = ResetStore::neu(
            Duration::minutes(auth.reset_lebensdauer_minuten),
            uhr.clone(),
        );
        let cleanup = ResetStore::cleanup_task_starten(
            reset_store.clone(),
            std::time::Duration::from_secs(auth.reset_cleanup_minuten.max(1) * 60),
        );

        let state = ApiState::neu(
            repo.clone(),
            uhr,
            token_dienst,
            reset_store,
            self.config.auth_optionen(),
            CampusHubMetrics::neu()?,
        );
        let db_ueberwachung = db_ueberwachung_starten(
            repo,
            state.health.clone(),
            std::time::Duration::from_secs(
                self.config.observability.db_pruefintervall_sekunden.max(1),
            ),
        );
        start_admin_anlegen(&state, &self.config).await?;

        let konfig = ApiServerKonfig {
            bind_addr: self.config.bind_adresse()?,
            cors_origins: self.config.server.cors_origins.clone(),
            metriken_aktiviert: self.config.observability.metriken_aktiviert,
        };

        let ergebnis = ApiServer::neu(konfig)
            .starten(state, shutdown_signal())
            .await;

        cleanup.abort();
        db_ueberwachung.abort();
        tracing::info!("Server beendet");
        ergebnis
    }
}

/// Legt das konfigurierte Start-Admin-Konto an, falls die E-Mail frei ist
async fn start_admin_anlegen<R: Datenbank>(
    state: &ApiState<R>,
    config: &ServerConfig,
) -> Result<()> {
    let (Some(email), Some(passwort)) = (
        config.auth.start_admin_email.as_deref(),
        config.auth.start_admin_passwort.as_deref(),
    ) else {
        return Ok(());
    };

    match state.admin.konto_erstellen(email, "Admin", passwort, true).await {
        Ok(konto) => {
            tracing::info!(konto_id = %konto.id, email = %konto.email, "Start-Admin angelegt");
            Ok(())
        }
        Err(AuthError::EmailVergeben(_)) => {
            tracing::debug!(email = %email, "Start-Admin existiert bereits");
            Ok(())
        }
        Err(e) => Err(e).context("Start-Admin konnte nicht angelegt werden"),
    }
}

fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
            Err(e) => {
                tracing::error!(fehler = %e, "Shutdown-Signal nicht verfuegbar");
                std::future::pending::<()>().await;
            }
        }
    }
}
