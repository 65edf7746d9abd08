//! Passwort-Hashing mit Argon2id
//!
//! Neue Passwoerter werden immer als Argon2id-PHC-String gespeichert.
//! Altbestaende koennen noch Klartext enthalten; diese werden bei der
//! Verifikation erkannt und vom Aufrufer nach erfolgreichem Login
//! umgehasht.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

use crate::error::AuthError;

/// Argon2id-Parameter: 64 MiB, 3 Iterationen, 1 Thread
fn argon2_instanz() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(64 * 1024, 3, 1, None)
        .map_err(|e| AuthError::PasswortHashing(format!("Argon2-Parameter ungueltig: {e}")))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Ergebnis einer Passwort-Verifikation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verifikation {
    pub treffer: bool,
    /// Gespeicherter Wert war kein PHC-String (Klartext-Altbestand)
    pub legacy: bool,
}

impl Verifikation {
    /// Treffer gegen einen Klartext-Altbestand; muss umgehasht werden
    pub fn muss_migriert_werden(&self) -> bool {
        self.treffer && self.legacy
    }
}

/// Hasht ein Passwort mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
pub fn passwort_hashen(passwort: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2_instanz()?
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Verifiziert ein Passwort gegen den gespeicherten Wert
///
/// Schlaegt nie fehl: interne Verifier-Fehler zaehlen als kein Treffer.
pub fn passwort_verifizieren(passwort: &str, gespeichert: &str) -> Verifikation {
    let parsed = match PasswordHash::new(gespeichert) {
        Ok(parsed) => parsed,
        Err(_) => {
            return Verifikation {
                treffer: passwort == gespeichert,
                legacy: true,
            }
        }
    };

    let treffer = match argon2_instanz() {
        Ok(argon2) => argon2.verify_password(passwort.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            tracing::warn!(fehler = %e, "Passwort-Verifikation nicht moeglich");
            false
        }
    };

    Verifikation {
        treffer,
        legacy: false,
    }
}
