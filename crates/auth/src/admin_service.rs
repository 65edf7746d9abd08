//! Kontoverwaltung fuer Admins
//!
//! Jede Aenderung an Konto oder Profil invalidiert den Profil-Cache des
//! betroffenen Kontos. Die Kontoliste bereinigt abgelaufene Bans.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use campushub_core::KontoId;
use campushub_db::{
    Datenbank, KontoRecord, KontoRepository, KontoUpdate, ProfilRecord, ProfilRepository,
    ProfilUpdate,
};

use crate::{
    ban_service::BanService,
    error::{AuthError, AuthResult},
    profil_service::{nicht_gefunden_oder_db, ProfilService},
    service::konto_anlegen,
};

/// Konto aus Admin-Sicht (ohne Passwort-Hash)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminKontoAnsicht {
    pub id: KontoId,
    pub email: String,
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub ban_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AdminKontoAnsicht {
    fn aus_konto(konto: &KontoRecord, full_name: Option<String>) -> Self {
        // Ban-Felder sind ohne is_banned bedeutungslos
        let (ban_reason, ban_until) = if konto.is_banned {
            (konto.ban_reason.clone(), konto.ban_until)
        } else {
            (None, None)
        };
        Self {
            id: konto.id,
            email: konto.email.clone(),
            full_name,
            is_admin: konto.is_admin,
            is_active: konto.is_active,
            is_banned: konto.is_banned,
            ban_reason,
            ban_until,
            last_login: konto.last_login,
            created_at: konto.created_at,
        }
    }
}

/// Konto mit allen Profilfeldern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminKontoDetails {
    #[serde(flatten)]
    pub konto: AdminKontoAnsicht,
    pub profil: ProfilRecord,
}

/// Aenderungen durch einen Admin (nur gesetzte Felder werden geschrieben)
#[derive(Debug, Clone, Default)]
pub struct KontoAenderung {
    pub konto: KontoUpdate,
    pub profil: ProfilUpdate,
}

pub struct AdminService<R: Datenbank> {
    repo: Arc<R>,
    ban_service: Arc<BanService<R>>,
    profil_service: Arc<ProfilService<R>>,
    min_passwort_laenge: usize,
}

impl<R: Datenbank> AdminService<R> {
    pub fn neu(
        repo: Arc<R>,
        ban_service: Arc<BanService<R>>,
        profil_service: Arc<ProfilService<R>>,
        min_passwort_laenge: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            ban_service,
            profil_service,
            min_passwort_laenge,
        })
    }

    async fn name_laden(&self, id: KontoId) -> AuthResult<Option<String>> {
        match self.profil_service.profil_laden(id).await {
            Ok(ansicht) => Ok(ansicht.profil.full_name),
            // Zwischen Liste und Profil geloescht
            Err(AuthError::NichtGefunden(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Alle Konten, neueste zuerst; abgelaufene Bans werden dabei aufgehoben
    pub async fn konten_listen(&self) -> AuthResult<Vec<AdminKontoAnsicht>> {
        let konten = self.repo.list().await?;
        let konten = self.ban_service.abgelaufene_bereinigen(konten).await?;

        let mut ergebnis = Vec::with_capacity(konten.len());
        for konto in &konten {
            let name = self.name_laden(konto.id).await?;
            ergebnis.push(AdminKontoAnsicht::aus_konto(konto, name));
        }
        Ok(ergebnis)
    }

    pub async fn konto_laden(&self, id: KontoId) -> AuthResult<AdminKontoDetails> {
        let konto = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(id.to_string()))?;
        let profil = self.profil_service.profil_laden(id).await?.profil;

        Ok(AdminKontoDetails {
            konto: AdminKontoAnsicht::aus_konto(&konto, profil.full_name.clone()),
            profil,
        })
    }

    pub async fn konto_erstellen(
        &self,
        email: &str,
        full_name: &str,
        passwort: &str,
        is_admin: bool,
    ) -> AuthResult<AdminKontoAnsicht> {
        let konto = konto_anlegen(
            self.repo.as_ref(),
            email,
            full_name,
            passwort,
            is_admin,
            self.min_passwort_laenge,
        )
        .await?;

        tracing::info!(konto_id = %konto.id, is_admin, "Konto durch Admin angelegt");
        let name = Some(full_name.trim().to_string()).filter(|n| !n.is_empty());
        Ok(AdminKontoAnsicht::aus_konto(&konto, name))
    }

    pub async fn konto_aktualisieren(
        &self,
        id: KontoId,
        aenderung: KontoAenderung,
    ) -> AuthResult<AdminKontoDetails> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(id.to_string()))?;

        let ergebnis = self.schreiben(id, aenderung).await;
        // is_admin ist Teil der Profilansicht
        self.profil_service.profil_invalidieren(id);
        ergebnis?;

        tracing::info!(konto_id = %id, "Konto durch Admin aktualisiert");
        self.konto_laden(id).await
    }

    async fn schreiben(&self, id: KontoId, aenderung: KontoAenderung) -> AuthResult<()> {
        if !aenderung.konto.ist_leer() {
            self.repo
                .update(id, aenderung.konto)
                .await
                .map_err(nicht_gefunden_oder_db)?;
        }
        if !aenderung.profil.ist_leer() {
            self.repo
                .update_profile(id, aenderung.profil)
                .await
                .map_err(nicht_gefunden_oder_db)?;
        }
        Ok(())
    }

    /// Loescht ein Konto samt Profil; das eigene Konto ist ausgenommen
    pub async fn konto_loeschen(&self, actor_id: KontoId, id: KontoId) -> AuthResult<()> {
        if actor_id == id {
            return Err(AuthError::validierung("Eigenes Konto kann nicht geloescht werden"));
        }

        match self.repo.delete(id).await {
            Ok(true) => self.profil_service.profil_invalidieren(id),
            Ok(false) => return Err(AuthError::NichtGefunden(id.to_string())),
            Err(e) => {
                // Store-Zustand unbekannt
                self.profil_service.profil_invalidieren(id);
                return Err(e.into());
            }
        }

        tracing::info!(konto_id = %id, actor_id = %actor_id, "Konto geloescht");
        Ok(())
    }
}
