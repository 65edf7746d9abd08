//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Auth-Logik vom konkreten
//! Credential-Store. Implementiert von [`crate::SqliteDb`] und
//! [`crate::MemoryDb`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campushub_core::KontoId;

use crate::error::DbError;
use crate::models::{
    FotoArt, KontoRecord, KontoUpdate, NeuesKonto, ProfilAnsicht, ProfilUpdate,
};

/// Result-Alias fuer Datenbankoperationen
pub type DbResult<T> = Result<T, DbError>;

/// Unterstuetzte Datenbank-Backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// SQLite – Standard fuer den Betrieb
    Sqlite,
    /// Fluechtiger Speicher – Entwicklung und Tests
    Memory,
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "SQLite"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

impl std::str::FromStr for DatabaseBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("Unbekanntes Datenbank-Backend: {other}")),
        }
    }
}

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Verbindungs-URL (z.B. "sqlite://campushub.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            url: "sqlite://campushub.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Zugriff auf Konten (Credential-Store-Adapter)
#[async_trait]
pub trait KontoRepository: Send + Sync {
    /// Legt ein neues Konto an; doppelte E-Mail ergibt `DbError::Eindeutigkeit`
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord>;

    async fn get_by_id(&self, id: KontoId) -> DbResult<Option<KontoRecord>>;

    /// Erwartet die E-Mail bereits normalisiert (getrimmt, kleingeschrieben)
    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>>;

    async fn update(&self, id: KontoId, data: KontoUpdate) -> DbResult<KontoRecord>;

    /// Loescht Konto samt Profil. Gibt `false` zurueck wenn nichts geloescht wurde.
    async fn delete(&self, id: KontoId) -> DbResult<bool>;

    /// Alle Konten, neueste zuerst
    async fn list(&self) -> DbResult<Vec<KontoRecord>>;

    async fn set_password_hash(&self, id: KontoId, hash: &str) -> DbResult<()>;

    async fn update_last_login(&self, id: KontoId, zeitpunkt: DateTime<Utc>) -> DbResult<()>;

    /// Setzt `is_banned` samt Grund und optionalem Ablauf
    async fn set_ban(
        &self,
        id: KontoId,
        grund: &str,
        bis: Option<DateTime<Utc>>,
    ) -> DbResult<KontoRecord>;

    /// Setzt alle drei Ban-Felder zurueck
    async fn clear_ban(&self, id: KontoId) -> DbResult<KontoRecord>;

    /// Prueft nur die Erreichbarkeit des Stores
    async fn ping(&self) -> DbResult<()>;
}

/// Zugriff auf Profile und die zusammengesetzte Profilansicht
#[async_trait]
pub trait ProfilRepository: Send + Sync {
    async fn create_profile(&self, id: KontoId, full_name: &str) -> DbResult<()>;

    /// Laedt Konto + Profil als Ansicht. `None` wenn das Konto fehlt.
    async fn load_profile_view(&self, id: KontoId) -> DbResult<Option<ProfilAnsicht>>;

    async fn update_profile(&self, id: KontoId, data: ProfilUpdate) -> DbResult<()>;

    async fn set_photo(&self, id: KontoId, art: FotoArt, url: &str) -> DbResult<()>;
}

/// Vollstaendiger Credential-Store (beide Repositories aus einer Quelle)
pub trait Datenbank: KontoRepository + ProfilRepository + 'static {}

impl<T> Datenbank for T where T: KontoRepository + ProfilRepository + 'static {}
