//! Zeitquelle fuer CampusHub
//!
//! Alle zeitabhaengigen Entscheidungen (Token-Ablauf, Ban-Ablauf,
//! Reset-Token-Ablauf) lesen "jetzt" ausschliesslich ueber [`Uhr`].
//! Zeitpunkte sind immer UTC; Umrechnung in lokale Zeit passiert nur
//! bei der Darstellung.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Quelle fuer den aktuellen Zeitpunkt
pub trait Uhr: Send + Sync {
    fn jetzt(&self) -> DateTime<Utc>;
}

/// Wanduhr des Systems
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUhr;

impl Uhr for SystemUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Steuerbare Uhr fuer Tests
///
/// Steht still bis sie explizit vorgestellt oder gesetzt wird.
#[derive(Debug)]
pub struct TestUhr {
    zeitpunkt: Mutex<DateTime<Utc>>,
}

impl TestUhr {
    pub fn neu(start: DateTime<Utc>) -> Self {
        Self {
            zeitpunkt: Mutex::new(start),
        }
    }

    /// Startet bei der aktuellen Systemzeit
    pub fn ab_jetzt() -> Self {
        Self::neu(Utc::now())
    }

    /// Stellt die Uhr um die gegebene Dauer vor
    pub fn vorstellen(&self, dauer: Duration) {
        let mut zeitpunkt = self.zeitpunkt.lock();
        *zeitpunkt += dauer;
    }

    pub fn setzen(&self, neu: DateTime<Utc>) {
        *self.zeitpunkt.lock() = neu;
    }
}

impl Uhr for TestUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        *self.zeitpunkt.lock()
    }
}
