//! Profil-Service: Read-Through ueber den [`ProfilCache`]
//!
//! Jeder Schreibpfad persistiert zuerst und invalidiert bzw. patcht den
//! Cache bevor er zurueckkehrt.

use std::sync::Arc;

use campushub_core::KontoId;
use campushub_db::{DbError, FotoArt, ProfilAnsicht, ProfilRepository, ProfilUpdate};

use crate::error::{AuthError, AuthResult};
use crate::profil_cache::ProfilCache;

pub struct ProfilService<R: ProfilRepository> {
    profil_repo: Arc<R>,
    cache: Arc<ProfilCache>,
}

impl<R: ProfilRepository> ProfilService<R> {
    pub fn neu(profil_repo: Arc<R>, cache: Arc<ProfilCache>) -> Arc<Self> {
        Arc::new(Self { profil_repo, cache })
    }

    pub fn cache(&self) -> &Arc<ProfilCache> {
        &self.cache
    }

    /// Liefert die Profilansicht, bei Bedarf aus dem Store nachgeladen
    ///
    /// Fehlende Konten und Store-Fehler werden nicht gecacht.
    pub async fn profil_laden(&self, id: KontoId) -> AuthResult<ProfilAnsicht> {
        if let Some(ansicht) = self.cache.get(id) {
            tracing::debug!(konto_id = %id, "Profil-Cache Treffer");
            return Ok(ansicht);
        }

        let marke = self.cache.lesemarke(id);
        let ansicht = self
            .profil_repo
            .load_profile_view(id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(id.to_string()))?;

        let eingefuegt = self.cache.put_wenn_aktuell(id, ansicht.clone(), marke);
        tracing::debug!(konto_id = %id, eingefuegt, "Profil-Cache Fehlgriff");
        Ok(ansicht)
    }

    /// Aktualisiert Profilfelder und liefert die frische Ansicht
    pub async fn profil_aktualisieren(
        &self,
        id: KontoId,
        update: ProfilUpdate,
    ) -> AuthResult<ProfilAnsicht> {
        let ergebnis = self.profil_repo.update_profile(id, update).await;
        // Auch bei Fehlern invalidieren; der Store-Zustand ist dann unbekannt
        self.cache.invalidieren(id);
        ergebnis.map_err(nicht_gefunden_oder_db)?;

        tracing::info!(konto_id = %id, "Profil aktualisiert");
        self.profil_laden(id).await
    }

    /// Setzt die URL eines Profil- oder Titelbilds
    pub async fn foto_aktualisieren(&self, id: KontoId, art: FotoArt, url: &str) -> AuthResult<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AuthError::validierung("Foto-URL darf nicht leer sein"));
        }

        self.profil_repo
            .set_photo(id, art, url)
            .await
            .map_err(nicht_gefunden_oder_db)?;

        let gepatcht = self.cache.foto_patchen(id, art, url);
        tracing::info!(konto_id = %id, art = ?art, gepatcht, "Profilfoto aktualisiert");
        Ok(())
    }

    pub fn profil_invalidieren(&self, id: KontoId) {
        self.cache.invalidieren(id);
        tracing::debug!(konto_id = %id, "Profil-Cache invalidiert");
    }
}

/// Ein fehlender Datensatz ist kein Store-Ausfall
pub(crate) fn nicht_gefunden_oder_db(e: DbError) -> AuthError {
    match e {
        DbError::NichtGefunden(was) => AuthError::NichtGefunden(was),
        andere => AuthError::Datenbank(andere),
    }
}
