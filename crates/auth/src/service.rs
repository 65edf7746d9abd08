//! Auth-Service fuer CampusHub
//!
//! Zentraler Service fuer Registrierung, Login und Passwort-Reset.
//! Nutzt den Credential-Store, den Token-Dienst, den Ban-Service und den
//! Reset-Store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use campushub_core::{KontoId, Uhr};
use campushub_db::{
    Datenbank, DbError, KontoRecord, KontoRepository, NeuesKonto, ProfilRepository,
};

use crate::{
    ban_service::BanService,
    error::{AuthError, AuthResult},
    password::{passwort_hashen, passwort_verifizieren},
    profil_service::nicht_gefunden_oder_db,
    reset::ResetStore,
    token::TokenDienst,
};

/// Einstellbare Regeln des Auth-Service
#[derive(Debug, Clone)]
pub struct AuthOptionen {
    pub min_passwort_laenge: usize,
    /// Dem Reset-Token vorangestellt, z.B. "https://campushub.example/sifre-sifirla?token="
    pub reset_link_basis: String,
}

impl Default for AuthOptionen {
    fn default() -> Self {
        Self {
            min_passwort_laenge: 6,
            reset_link_basis: "http://localhost:5173/sifre-sifirla?token=".into(),
        }
    }
}

/// Oeffentliche Sicht auf ein Konto nach dem Login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KontoZusammenfassung {
    pub id: KontoId,
    pub email: String,
    pub is_admin: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&KontoRecord> for KontoZusammenfassung {
    fn from(k: &KontoRecord) -> Self {
        Self {
            id: k.id,
            email: k.email.clone(),
            is_admin: k.is_admin,
            last_login: k.last_login,
        }
    }
}

/// Ergebnis eines erfolgreichen Logins
#[derive(Debug, Clone, Serialize)]
pub struct Anmeldung {
    pub token: String,
    pub konto: KontoZusammenfassung,
}

/// Trimmt und verkleinert eine E-Mail-Adresse
pub fn email_normalisieren(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn passwort_laenge_pruefen(passwort: &str, minimum: usize) -> AuthResult<()> {
    if passwort.chars().count() < minimum {
        return Err(AuthError::PasswortZuKurz(minimum));
    }
    Ok(())
}

/// Legt Konto und Profil an
///
/// Gemeinsamer Pfad fuer Selbstregistrierung und Admin-Anlage. Der Name
/// darf hier leer sein; die Selbstregistrierung prueft ihn vorher.
pub(crate) async fn konto_anlegen<R: Datenbank>(
    repo: &R,
    email: &str,
    full_name: &str,
    passwort: &str,
    is_admin: bool,
    min_passwort_laenge: usize,
) -> AuthResult<KontoRecord> {
    let email = email_normalisieren(email);
    if email.is_empty() || passwort.is_empty() {
        return Err(AuthError::validierung("E-Mail und Passwort sind erforderlich"));
    }
    if !email.contains('@') {
        return Err(AuthError::validierung("Ungueltige E-Mail-Adresse"));
    }
    passwort_laenge_pruefen(passwort, min_passwort_laenge)?;

    if repo.get_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailVergeben(email));
    }

    let hash = passwort_hashen(passwort)?;
    let konto = repo
        .create(NeuesKonto {
            email: &email,
            password_hash: &hash,
            is_admin,
        })
        .await
        .map_err(|e| match e {
            DbError::Eindeutigkeit(_) => AuthError::EmailVergeben(email.clone()),
            andere => AuthError::Datenbank(andere),
        })?;

    repo.create_profile(konto.id, full_name.trim()).await?;
    Ok(konto)
}

/// Auth-Service – Einstiegspunkt fuer alle Anmeldevorgaenge
pub struct AuthService<R: Datenbank> {
    repo: Arc<R>,
    token_dienst: Arc<TokenDienst>,
    ban_service: Arc<BanService<R>>,
    reset_store: Arc<ResetStore>,
    uhr: Arc<dyn Uhr>,
    optionen: AuthOptionen,
}

impl<R: Datenbank> AuthService<R> {
    pub fn neu(
        repo: Arc<R>,
        token_dienst: Arc<TokenDienst>,
        ban_service: Arc<BanService<R>>,
        reset_store: Arc<ResetStore>,
        uhr: Arc<dyn Uhr>,
        optionen: AuthOptionen,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            token_dienst,
            ban_service,
            reset_store,
            uhr,
            optionen,
        })
    }

    pub fn optionen(&self) -> &AuthOptionen {
        &self.optionen
    }

    /// Registriert ein neues Konto samt Profil
    pub async fn registrieren(
        &self,
        email: &str,
        full_name: &str,
        passwort: &str,
    ) -> AuthResult<KontoRecord> {
        if full_name.trim().is_empty() {
            return Err(AuthError::validierung("E-Mail, Name und Passwort sind erforderlich"));
        }

        let konto = konto_anlegen(
            self.repo.as_ref(),
            email,
            full_name,
            passwort,
            false,
            self.optionen.min_passwort_laenge,
        )
        .await?;

        tracing::info!(konto_id = %konto.id, email = %konto.email, "Neues Konto registriert");
        Ok(konto)
    }

    /// Meldet ein Konto an und stellt ein Bearer-Token aus
    ///
    /// Reihenfolge: Passwort, Aktiv-Status, Ban-Bewertung. Ein Klartext-
    /// Altbestand wird nach erfolgreichem Login umgehasht.
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<Anmeldung> {
        let email = email_normalisieren(email);
        if email.is_empty() || passwort.is_empty() {
            return Err(AuthError::validierung("E-Mail und Passwort sind erforderlich"));
        }

        let konto = match self.repo.get_by_email(&email).await? {
            Some(konto) => konto,
            None => {
                tracing::warn!(email = %email, "Login fuer unbekannte E-Mail");
                return Err(AuthError::UngueltigeAnmeldedaten);
            }
        };

        let verifikation = passwort_verifizieren(passwort, &konto.password_hash);
        if !verifikation.treffer {
            tracing::warn!(konto_id = %konto.id, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        if !konto.is_active {
            return Err(AuthError::BenutzerGesperrt);
        }

        let konto = self.ban_service.anmeldung_pruefen(konto).await?;

        if verifikation.muss_migriert_werden() {
            self.altbestand_migrieren(konto.id, passwort).await;
        }

        let jetzt = self.uhr.jetzt();
        if let Err(e) = self.repo.update_last_login(konto.id, jetzt).await {
            tracing::warn!(konto_id = %konto.id, fehler = %e, "last_login konnte nicht gesetzt werden");
        }

        let token = self
            .token_dienst
            .ausstellen(konto.id, &konto.email, konto.is_admin)?;

        let mut zusammenfassung = KontoZusammenfassung::from(&konto);
        zusammenfassung.last_login = Some(jetzt);

        tracing::info!(konto_id = %konto.id, "Konto angemeldet");
        Ok(Anmeldung {
            token,
            konto: zusammenfassung,
        })
    }

    /// Ersetzt einen Klartext-Altbestand durch einen Argon2id-Hash
    ///
    /// Fehler blockieren den Login nicht; der naechste Login versucht es erneut.
    async fn altbestand_migrieren(&self, konto_id: KontoId, passwort: &str) {
        let ergebnis = match passwort_hashen(passwort) {
            Ok(hash) => self
                .repo
                .set_password_hash(konto_id, &hash)
                .await
                .map_err(AuthError::from),
            Err(e) => Err(e),
        };

        match ergebnis {
            Ok(()) => tracing::info!(konto_id = %konto_id, "Klartext-Passwort migriert"),
            Err(e) => tracing::warn!(
                konto_id = %konto_id,
                fehler = %e,
                "Migration des Klartext-Passworts fehlgeschlagen"
            ),
        }
    }

    /// Erstellt ein Reset-Token und gibt den Reset-Link zurueck
    pub async fn passwort_reset_anfordern(&self, email: &str) -> AuthResult<String> {
        let email = email_normalisieren(email);
        if email.is_empty() {
            return Err(AuthError::validierung("E-Mail ist erforderlich"));
        }

        let konto = self
            .repo
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(format!("E-Mail {email}")))?;

        let token = self.reset_store.erstellen(&konto.email);
        tracing::info!(konto_id = %konto.id, "Passwort-Reset angefordert");
        Ok(format!("{}{}", self.optionen.reset_link_basis, token))
    }

    /// Setzt das Passwort ueber ein Reset-Token neu
    ///
    /// Das Token wird erst verbraucht, wenn der neue Hash gespeichert ist.
    /// Waehrend des Schreibens ist es entnommen, damit nur ein Reset pro
    /// Token gewinnt; schlaegt das Schreiben fehl, liegt es danach wieder
    /// im Store.
    pub async fn passwort_zuruecksetzen(&self, token: &str, neues_passwort: &str) -> AuthResult<()> {
        let email = self.reset_store.pruefen(token)?;
        passwort_laenge_pruefen(neues_passwort, self.optionen.min_passwort_laenge)?;

        let konto = self
            .repo
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(format!("E-Mail {email}")))?;

        let hash = passwort_hashen(neues_passwort)?;
        let eintrag = self.reset_store.entnehmen(token)?;
        if let Err(e) = self.repo.set_password_hash(konto.id, &hash).await {
            self.reset_store.zuruecklegen(token, eintrag);
            tracing::warn!(konto_id = %konto.id, fehler = %e, "Passwort-Reset nicht gespeichert");
            return Err(nicht_gefunden_oder_db(e));
        }

        tracing::info!(konto_id = %konto.id, "Passwort zurueckgesetzt");
        Ok(())
    }
}
