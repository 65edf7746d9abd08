//! Ban-Lebenszyklus fuer Konten
//!
//! Bans sind entweder permanent (`ban_until` leer) oder zeitlich begrenzt.
//! Es gibt keinen Hintergrund-Job: abgelaufene Bans werden beim naechsten
//! Login-Versuch oder bei der naechsten Admin-Kontoliste erkannt und
//! entfernt. Beide Stellen nutzen dieselbe Bewertung.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use campushub_core::{KontoId, Uhr};
use campushub_db::{KontoRecord, KontoRepository};

use crate::error::{AuthError, AuthResult};

/// Grund wenn beim Bannen keiner angegeben wurde
pub const STANDARD_BAN_GRUND: &str = "Unbekannter Grund";

/// Verbleibende Dauer eines zeitlich begrenzten Bans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Restdauer {
    /// Gesamtdauer in Sekunden
    pub sekunden: i64,
    pub tage: i64,
    pub stunden: i64,
    pub minuten: i64,
}

impl Restdauer {
    pub fn aus_sekunden(sekunden: i64) -> Self {
        Self {
            sekunden,
            tage: sekunden / 86_400,
            stunden: (sekunden % 86_400) / 3_600,
            minuten: (sekunden % 3_600) / 60,
        }
    }
}

/// Ergebnis der Ban-Bewertung zu einem Zeitpunkt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BanBewertung {
    Frei,
    /// Zeitlich begrenzter Ban, dessen Ende erreicht ist
    Abgelaufen,
    Aktiv {
        grund: String,
        restdauer: Option<Restdauer>,
    },
}

/// Bewertet den Ban-Status eines Kontos zum Zeitpunkt `jetzt`
///
/// Reine Funktion ohne Seiteneffekte.
pub fn ban_bewerten(konto: &KontoRecord, jetzt: DateTime<Utc>) -> BanBewertung {
    if !konto.is_banned {
        return BanBewertung::Frei;
    }

    let grund = konto
        .ban_reason
        .clone()
        .unwrap_or_else(|| STANDARD_BAN_GRUND.to_string());

    match konto.ban_until {
        None => BanBewertung::Aktiv {
            grund,
            restdauer: None,
        },
        Some(bis) if jetzt >= bis => BanBewertung::Abgelaufen,
        Some(bis) => BanBewertung::Aktiv {
            grund,
            restdauer: Some(Restdauer::aus_sekunden((bis - jetzt).num_seconds())),
        },
    }
}

/// Ban-Service – Sperren, Entsperren und Selbstablauf
pub struct BanService<R: KontoRepository> {
    konto_repo: Arc<R>,
    uhr: Arc<dyn Uhr>,
}

impl<R: KontoRepository> BanService<R> {
    pub fn neu(konto_repo: Arc<R>, uhr: Arc<dyn Uhr>) -> Arc<Self> {
        Arc::new(Self { konto_repo, uhr })
    }

    /// Bewertet ein Konto und raeumt einen abgelaufenen Ban sofort ab
    ///
    /// Gibt das (ggf. bereinigte) Konto und die Bewertung zurueck.
    async fn bewerten_und_bereinigen(
        &self,
        konto: KontoRecord,
    ) -> AuthResult<(KontoRecord, BanBewertung)> {
        let bewertung = ban_bewerten(&konto, self.uhr.jetzt());
        if bewertung != BanBewertung::Abgelaufen {
            return Ok((konto, bewertung));
        }

        let bereinigt = self.konto_repo.clear_ban(konto.id).await?;
        tracing::info!(konto_id = %konto.id, "Abgelaufener Ban aufgehoben");
        Ok((bereinigt, BanBewertung::Frei))
    }

    /// Ban-Pruefung beim Login
    ///
    /// Aktive Bans fuehren zu `BenutzerGebannt`, abgelaufene werden entfernt.
    pub async fn anmeldung_pruefen(&self, konto: KontoRecord) -> AuthResult<KontoRecord> {
        match self.bewerten_und_bereinigen(konto).await? {
            (konto, BanBewertung::Aktiv { grund, restdauer }) => {
                tracing::warn!(konto_id = %konto.id, grund = %grund, "Login eines gebannten Kontos");
                Err(AuthError::BenutzerGebannt { grund, restdauer })
            }
            (konto, _) => Ok(konto),
        }
    }

    /// Sammel-Bereinigung fuer die Admin-Kontoliste
    ///
    /// Lehnt nichts ab; aktive Bans bleiben in der Liste sichtbar.
    pub async fn abgelaufene_bereinigen(
        &self,
        konten: Vec<KontoRecord>,
    ) -> AuthResult<Vec<KontoRecord>> {
        let mut ergebnis = Vec::with_capacity(konten.len());
        let mut bereinigt = 0usize;
        for konto in konten {
            let war_gebannt = konto.is_banned;
            let (konto, _) = self.bewerten_und_bereinigen(konto).await?;
            if war_gebannt && !konto.is_banned {
                bereinigt += 1;
            }
            ergebnis.push(konto);
        }
        if bereinigt > 0 {
            tracing::info!(anzahl = bereinigt, "Abgelaufene Bans bei Kontoliste bereinigt");
        }
        Ok(ergebnis)
    }

    /// Bannt ein Konto
    ///
    /// `bis` – Ende des Bans; `None` = permanent. Selbst-Ban und ein Ende in
    /// der Vergangenheit werden abgelehnt. Erneutes Bannen ueberschreibt.
    pub async fn bannen(
        &self,
        actor_id: KontoId,
        ziel_id: KontoId,
        grund: Option<&str>,
        bis: Option<DateTime<Utc>>,
    ) -> AuthResult<KontoRecord> {
        if actor_id == ziel_id {
            return Err(AuthError::validierung("Eigenes Konto kann nicht gebannt werden"));
        }
        if let Some(bis) = bis {
            if bis <= self.uhr.jetzt() {
                return Err(AuthError::validierung("Ban-Ende liegt in der Vergangenheit"));
            }
        }

        self.konto_repo
            .get_by_id(ziel_id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(ziel_id.to_string()))?;

        let grund = grund
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(STANDARD_BAN_GRUND);

        let konto = self.konto_repo.set_ban(ziel_id, grund, bis).await?;

        tracing::info!(
            konto_id = %ziel_id,
            actor_id = %actor_id,
            grund = %grund,
            bis = ?bis,
            "Konto gebannt"
        );
        Ok(konto)
    }

    /// Hebt einen Ban bedingungslos auf
    pub async fn entbannen(&self, ziel_id: KontoId) -> AuthResult<KontoRecord> {
        self.konto_repo
            .get_by_id(ziel_id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(ziel_id.to_string()))?;

        let konto = self.konto_repo.clear_ban(ziel_id).await?;
        tracing::info!(konto_id = %ziel_id, "Ban aufgehoben");
        Ok(konto)
    }
}
