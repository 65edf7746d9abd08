//! Gemeinsame Identifikationstypen fuer CampusHub
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};

/// Eindeutige numerische Konto-ID (Primaerschluessel der `users`-Tabelle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KontoId(pub i64);

impl KontoId {
    /// Gibt den inneren Zahlenwert zurueck
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl From<i64> for KontoId {
    fn from(wert: i64) -> Self {
        Self(wert)
    }
}

impl std::fmt::Display for KontoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "konto:{}", self.0)
    }
}

impl std::str::FromStr for KontoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roh = s.strip_prefix("konto:").unwrap_or(s);
        roh.parse::<i64>().map(Self)
    }
}
