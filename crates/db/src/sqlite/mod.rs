//! SQLite-Backend fuer KontoRepository und ProfilRepository

pub mod konten;
pub mod pool;
pub mod profile;

pub use pool::SqliteDb;

use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::repository::DbResult;

/// Liest einen RFC-3339-Zeitstempel aus einer Textspalte
pub(crate) fn zeit_parsen(spalte: &str, wert: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {spalte} '{wert}': {e}")))
}

pub(crate) fn zeit_parsen_opt(spalte: &str, wert: Option<String>) -> DbResult<Option<DateTime<Utc>>> {
    wert.as_deref().map(|s| zeit_parsen(spalte, s)).transpose()
}
