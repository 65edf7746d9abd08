//! Fluechtiger Credential-Store
//!
//! Haelt Konten und Profile im Speicher. Gedacht fuer Entwicklung
//! (`backend = "memory"`) und Tests: Ausfaelle lassen sich gezielt
//! simulieren und Profil-Ladevorgaenge werden gezaehlt.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use campushub_core::{KontoId, SystemUhr, Uhr};

use crate::error::DbError;
use crate::models::{
    FotoArt, KontoRecord, KontoUpdate, NeuesKonto, ProfilAnsicht, ProfilRecord, ProfilUpdate,
};
use crate::repository::{DbResult, KontoRepository, ProfilRepository};

#[derive(Default)]
struct Inhalt {
    konten: BTreeMap<KontoId, KontoRecord>,
    profile: HashMap<KontoId, ProfilRecord>,
    naechste_id: i64,
}

/// In-Memory-Implementierung beider Repositories
pub struct MemoryDb {
    inhalt: Mutex<Inhalt>,
    uhr: Arc<dyn Uhr>,
    ausfall: AtomicBool,
    schreibfehler: AtomicBool,
    profil_ladevorgaenge: AtomicUsize,
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::mit_uhr(Arc::new(SystemUhr))
    }
}

impl MemoryDb {
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `created_at` neuer Konten kommt aus der gegebenen Uhr
    pub fn mit_uhr(uhr: Arc<dyn Uhr>) -> Self {
        Self {
            inhalt: Mutex::new(Inhalt {
                naechste_id: 1,
                ..Default::default()
            }),
            uhr,
            ausfall: AtomicBool::new(false),
            schreibfehler: AtomicBool::new(false),
            profil_ladevorgaenge: AtomicUsize::new(0),
        }
    }

    /// Alle Operationen schlagen fehl solange aktiv
    pub fn ausfall_simulieren(&self, aktiv: bool) {
        self.ausfall.store(aktiv, Ordering::SeqCst);
    }

    /// Nur schreibende Operationen schlagen fehl solange aktiv
    pub fn schreibfehler_simulieren(&self, aktiv: bool) {
        self.schreibfehler.store(aktiv, Ordering::SeqCst);
    }

    /// Anzahl der `load_profile_view`-Aufrufe seit Erstellung
    pub fn profil_ladevorgaenge(&self) -> usize {
        self.profil_ladevorgaenge.load(Ordering::SeqCst)
    }

    fn lesen_pruefen(&self) -> DbResult<()> {
        if self.ausfall.load(Ordering::SeqCst) {
            return Err(DbError::NichtErreichbar("simulierter Ausfall".into()));
        }
        Ok(())
    }

    fn schreiben_pruefen(&self) -> DbResult<()> {
        self.lesen_pruefen()?;
        if self.schreibfehler.load(Ordering::SeqCst) {
            return Err(DbError::NichtErreichbar("simulierter Schreibfehler".into()));
        }
        Ok(())
    }

    fn konto_aendern<F>(&self, id: KontoId, f: F) -> DbResult<KontoRecord>
    where
        F: FnOnce(&mut KontoRecord),
    {
        self.schreiben_pruefen()?;
        let mut inhalt = self.inhalt.lock();
        let konto = inhalt
            .konten
            .get_mut(&id)
            .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))?;
        f(konto);
        Ok(konto.clone())
    }
}

#[async_trait]
impl KontoRepository for MemoryDb {
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        self.schreiben_pruefen()?;
        let mut inhalt = self.inhalt.lock();
        if inhalt.konten.values().any(|k| k.email == data.email) {
            return Err(DbError::Eindeutigkeit(format!(
                "E-Mail '{}' bereits vergeben",
                data.email
            )));
        }

        let id = KontoId(inhalt.naechste_id);
        inhalt.naechste_id += 1;

        let konto = KontoRecord {
            id,
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            is_admin: data.is_admin,
            is_active: true,
            is_banned: false,
            ban_reason: None,
            ban_until: None,
            last_login: None,
            created_at: self.uhr.jetzt(),
        };
        inhalt.konten.insert(id, konto.clone());
        Ok(konto)
    }

    async fn ping(&self) -> DbResult<()> {
        self.lesen_pruefen()
    }

    async fn get_by_id(&self, id: KontoId) -> DbResult<Option<KontoRecord>> {
        self.lesen_pruefen()?;
        Ok(self.inhalt.lock().konten.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>> {
        self.lesen_pruefen()?;
        Ok(self
            .inhalt
            .lock()
            .konten
            .values()
            .find(|k| k.email == email)
            .cloned())
    }

    async fn update(&self, id: KontoId, data: KontoUpdate) -> DbResult<KontoRecord> {
        self.konto_aendern(id, |k| {
            if let Some(v) = data.is_admin {
                k.is_admin = v;
            }
            if let Some(v) = data.is_active {
                k.is_active = v;
            }
        })
    }

    async fn delete(&self, id: KontoId) -> DbResult<bool> {
        self.schreiben_pruefen()?;
        let mut inhalt = self.inhalt.lock();
        inhalt.profile.remove(&id);
        Ok(inhalt.konten.remove(&id).is_some())
    }

    async fn list(&self) -> DbResult<Vec<KontoRecord>> {
        self.lesen_pruefen()?;
        let mut konten: Vec<KontoRecord> = self.inhalt.lock().konten.values().cloned().collect();
        konten.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(konten)
    }

    async fn set_password_hash(&self, id: KontoId, hash: &str) -> DbResult<()> {
        self.konto_aendern(id, |k| k.password_hash = hash.to_string())
            .map(|_| ())
    }

    async fn update_last_login(&self, id: KontoId, zeitpunkt: DateTime<Utc>) -> DbResult<()> {
        self.konto_aendern(id, |k| k.last_login = Some(zeitpunkt))
            .map(|_| ())
    }

    async fn set_ban(
        &self,
        id: KontoId,
        grund: &str,
        bis: Option<DateTime<Utc>>,
    ) -> DbResult<KontoRecord> {
        self.konto_aendern(id, |k| {
            k.is_banned = true;
            k.ban_reason = Some(grund.to_string());
            k.ban_until = bis;
        })
    }

    async fn clear_ban(&self, id: KontoId) -> DbResult<KontoRecord> {
        self.konto_aendern(id, |k| {
            k.is_banned = false;
            k.ban_reason = None;
            k.ban_until = None;
        })
    }
}

#[async_trait]
impl ProfilRepository for MemoryDb {
    async fn create_profile(&self, id: KontoId, full_name: &str) -> DbResult<()> {
        self.schreiben_pruefen()?;
        let mut inhalt = self.inhalt.lock();
        if !inhalt.konten.contains_key(&id) {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }
        if inhalt.profile.contains_key(&id) {
            return Err(DbError::Eindeutigkeit(format!("Profil fuer {id} existiert bereits")));
        }
        inhalt.profile.insert(
            id,
            ProfilRecord {
                full_name: Some(full_name.to_string()),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn load_profile_view(&self, id: KontoId) -> DbResult<Option<ProfilAnsicht>> {
        self.profil_ladevorgaenge.fetch_add(1, Ordering::SeqCst);
        self.lesen_pruefen()?;
        let inhalt = self.inhalt.lock();
        Ok(inhalt.konten.get(&id).map(|konto| {
            let profil = inhalt.profile.get(&id).cloned().unwrap_or_default();
            ProfilAnsicht::aus_teilen(konto, profil)
        }))
    }

    async fn update_profile(&self, id: KontoId, data: ProfilUpdate) -> DbResult<()> {
        self.schreiben_pruefen()?;
        let mut inhalt = self.inhalt.lock();
        if !inhalt.konten.contains_key(&id) {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }
        data.anwenden(inhalt.profile.entry(id).or_default());
        Ok(())
    }

    async fn set_photo(&self, id: KontoId, art: FotoArt, url: &str) -> DbResult<()> {
        self.schreiben_pruefen()?;
        let mut inhalt = self.inhalt.lock();
        if !inhalt.konten.contains_key(&id) {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }
        let profil = inhalt.profile.entry(id).or_default();
        match art {
            FotoArt::Profile => profil.profile_photo = Some(url.to_string()),
            FotoArt::Cover => profil.cover_photo = Some(url.to_string()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campushub_core::TestUhr;
    use chrono::Duration;

    fn neues(email: &str) -> NeuesKonto<'_> {
        NeuesKonto {
            email,
            password_hash: "hash",
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn doppelte_email_wird_abgelehnt() {
        let db = MemoryDb::default();
        db.create(neues("a@x.edu")).await.unwrap();
        let err = db.create(neues("a@x.edu")).await.unwrap_err();
        assert!(err.ist_eindeutigkeit());
    }

    #[tokio::test]
    async fn liste_neueste_zuerst() {
        let uhr = Arc::new(TestUhr::ab_jetzt());
        let db = MemoryDb::mit_uhr(uhr.clone());
        let a = db.create(neues("a@x.edu")).await.unwrap();
        uhr.vorstellen(Duration::seconds(1));
        let b = db.create(neues("b@x.edu")).await.unwrap();

        let liste = db.list().await.unwrap();
        assert_eq!(liste[0].id, b.id);
        assert_eq!(liste[1].id, a.id);
    }

    #[tokio::test]
    async fn ausfall_trifft_alle_operationen() {
        let db = MemoryDb::default();
        let k = db.create(neues("a@x.edu")).await.unwrap();
        db.ausfall_simulieren(true);
        assert!(matches!(
            db.get_by_id(k.id).await,
            Err(DbError::NichtErreichbar(_))
        ));
        assert!(db.ping().await.is_err());
        db.ausfall_simulieren(false);
        assert!(db.get_by_id(k.id).await.unwrap().is_some());
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn schreibfehler_laesst_lesen_zu() {
        let db = MemoryDb::default();
        let k = db.create(neues("a@x.edu")).await.unwrap();
        db.schreibfehler_simulieren(true);
        assert!(db.get_by_id(k.id).await.unwrap().is_some());
        assert!(db.set_password_hash(k.id, "neu").await.is_err());
    }

    #[tokio::test]
    async fn loeschen_entfernt_profil() {
        let db = MemoryDb::default();
        let k = db.create(neues("a@x.edu")).await.unwrap();
        db.create_profile(k.id, "Alice").await.unwrap();
        assert!(db.delete(k.id).await.unwrap());
        assert!(db.load_profile_view(k.id).await.unwrap().is_none());
        assert!(!db.delete(k.id).await.unwrap());
    }
}
