//! Erreichbarkeit des Stores fuer `/health`

use std::sync::Arc;
use std::time::Duration;

use campushub_db::{Datenbank, KontoRepository};
use campushub_observability::HealthState;

/// Standard-Intervall der DB-Pruefung
pub const STANDARD_PRUEFINTERVALL: Duration = Duration::from_secs(30);

/// Pingt den Store einmal und traegt das Ergebnis in den Health-State ein
pub async fn db_pruefen<R: KontoRepository>(repo: &R, health: &HealthState) -> bool {
    let verbunden = match repo.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(fehler = %e, "Datenbank nicht erreichbar");
            false
        }
    };

    if verbunden != health.db_verbunden() {
        tracing::info!(verbunden, "DB-Status geaendert");
    }
    health.db_status_setzen(verbunden);
    verbunden
}

/// Startet die periodische DB-Pruefung als tokio-Task
///
/// Die erste Pruefung laeuft sofort.
pub fn db_ueberwachung_starten<R: Datenbank>(
    repo: Arc<R>,
    health: HealthState,
    intervall: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut takt = tokio::time::interval(intervall);
        loop {
            takt.tick().await;
            db_pruefen(repo.as_ref(), &health).await;
        }
    })
}
