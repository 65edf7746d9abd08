//! campushub-auth – Session- und Autorisierungskern
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id (inkl. Migration von Klartext-Altbestaenden)
//! - Bearer-Tokens (HS256) mit getrennten Fehlern fuer Ablauf und Manipulation
//! - Ban-Lebenszyklus mit Selbstablauf bei Login und Kontoliste
//! - Waechter fuer angemeldete und Admin-Operationen
//! - Profil-Cache mit Invalidierung auf jedem Schreibpfad
//! - Passwort-Reset ueber einmal einloesbare Tokens
//! - AuthService und AdminService als Einstiegspunkte

pub mod admin_service;
pub mod ban_service;
pub mod error;
pub mod guard;
pub mod password;
pub mod profil_cache;
pub mod profil_service;
pub mod reset;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use admin_service::{AdminKontoAnsicht, AdminKontoDetails, AdminService, KontoAenderung};
pub use ban_service::{ban_bewerten, BanBewertung, BanService, Restdauer};
pub use error::{AuthError, AuthResult};
pub use guard::{bearer_extrahieren, Waechter};
pub use password::{passwort_hashen, passwort_verifizieren, Verifikation};
pub use profil_cache::{Lesemarke, ProfilCache};
pub use profil_service::ProfilService;
pub use reset::ResetStore;
pub use service::{email_normalisieren, Anmeldung, AuthOptionen, AuthService, KontoZusammenfassung};
pub use token::{TokenClaims, TokenDienst};
