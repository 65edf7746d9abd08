//! SQLite Connection Pool mit WAL-Modus

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use campushub_core::{SystemUhr, Uhr};

use crate::error::DbError;
use crate::repository::DatabaseConfig;

/// Credential-Store auf Basis eines SQLite-Pools
#[derive(Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
    /// Quelle fuer `created_at`
    pub(crate) uhr: Arc<dyn Uhr>,
}

impl fmt::Debug for SqliteDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDb")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl SqliteDb {
    /// Oeffnet (oder erstellt) die Datenbankdatei und fuehrt Migrationen aus
    pub async fn oeffnen(config: &DatabaseConfig) -> Result<Self, DbError> {
        let opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(if config.sqlite_wal {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            })
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_verbindungen)
            .connect_with(opts)
            .await
            .map_err(|e| DbError::NichtErreichbar(format!("{}: {e}", config.url)))?;

        info!(url = %config.url, wal = config.sqlite_wal, "SQLite-Pool geoeffnet");

        let db = Self::aus_pool(pool);
        db.migrationen_ausfuehren().await?;

        Ok(db)
    }

    fn aus_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            uhr: Arc::new(SystemUhr),
        }
    }

    /// Ersetzt die Uhr, aus der `created_at` neuer Konten kommt
    pub fn mit_uhr(mut self, uhr: Arc<dyn Uhr>) -> Self {
        self.uhr = uhr;
        self
    }

    pub async fn migrationen_ausfuehren(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Datenbank-Migrationen abgeschlossen");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// In-Memory-Datenbank fuer Tests
    pub async fn in_memory() -> Result<Self, DbError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Jede Verbindung haette sonst ihre eigene leere Datenbank
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(opts)
            .await?;

        let db = Self::aus_pool(pool);
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }
}
