//! Fehlertypen fuer den Auth-Service

use thiserror::Error;

use crate::ban_service::Restdauer;

/// Alle moeglichen Fehler im Session- und Autorisierungskern
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingaben ---
    #[error("Ungueltige Eingabe: {0}")]
    Validierung(String),

    #[error("Passwort muss mindestens {0} Zeichen lang sein")]
    PasswortZuKurz(usize),

    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Authentifizierung ---
    #[error("E-Mail oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Konto deaktiviert")]
    BenutzerGesperrt,

    #[error("Konto gebannt: {grund}")]
    BenutzerGebannt {
        grund: String,
        /// `None` bei permanentem Ban
        restdauer: Option<Restdauer>,
    },

    // --- Bearer-Token ---
    #[error("Bitte anmelden: Token fehlt")]
    TokenFehlt,

    #[error("Authorization-Header fehlt oder hat falsches Format")]
    TokenFormat,

    #[error("Session abgelaufen, bitte erneut anmelden")]
    SessionAbgelaufen,

    #[error("Token ungueltig")]
    TokenUngueltig,

    // --- Berechtigungen ---
    #[error("Keine Berechtigung fuer diese Aktion")]
    KeineBerechtigung,

    // --- Kontoverwaltung ---
    #[error("E-Mail bereits registriert: {0}")]
    EmailVergeben(String),

    // --- Passwort-Reset ---
    #[error("Reset-Token ungueltig oder abgelaufen")]
    ResetTokenUngueltig,

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] campushub_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn validierung(msg: impl Into<String>) -> Self {
        Self::Validierung(msg.into())
    }

    /// Kurzer, stabiler Bezeichner fuer Logs und Fehlerantworten
    pub fn art(&self) -> &'static str {
        match self {
            Self::Validierung(_) => "validation",
            Self::PasswortZuKurz(_) => "password_too_short",
            Self::NichtGefunden(_) => "not_found",
            Self::PasswortHashing(_) => "password_hashing",
            Self::UngueltigeAnmeldedaten => "invalid_credentials",
            Self::BenutzerGesperrt => "account_inactive",
            Self::BenutzerGebannt { .. } => "banned",
            Self::TokenFehlt => "missing_token",
            Self::TokenFormat => "malformed_token",
            Self::SessionAbgelaufen => "expired_token",
            Self::TokenUngueltig => "invalid_token",
            Self::KeineBerechtigung => "forbidden",
            Self::EmailVergeben(_) => "email_taken",
            Self::ResetTokenUngueltig => "invalid_reset_token",
            Self::Datenbank(_) => "storage",
            Self::Intern(_) => "internal",
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
