//! Bearer-Token fuer angemeldete Konten
//!
//! Zustandslose HS256-JWTs mit fester Lebensdauer. Es gibt keine
//! Sperrliste; ein Token bleibt bis `exp` gueltig. Der Ablauf wird gegen
//! die injizierte [`Uhr`] geprueft, nicht gegen die Systemzeit der
//! JWT-Bibliothek.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use campushub_core::{KontoId, Uhr};

use crate::error::{AuthError, AuthResult};

/// Mindestlaenge des HMAC-Secrets in Bytes
pub const MIN_SECRET_BYTES: usize = 32;

/// Standard-Lebensdauer eines Tokens: 24 Stunden
pub const STANDARD_LEBENSDAUER_STUNDEN: i64 = 24;

/// Inhalt eines Bearer-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Konto-ID
    pub sub: i64,
    pub email: String,
    /// Admin-Status zum Ausstellungszeitpunkt; nicht fuer Berechtigungen verwenden
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn konto_id(&self) -> KontoId {
        KontoId(self.sub)
    }
}

/// Stellt Bearer-Tokens aus und prueft sie
pub struct TokenDienst {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validierung: Validation,
    lebensdauer: Duration,
    uhr: Arc<dyn Uhr>,
}

impl std::fmt::Debug for TokenDienst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDienst")
            .field("lebensdauer", &self.lebensdauer)
            .finish_non_exhaustive()
    }
}

impl TokenDienst {
    /// Erstellt den Dienst; Secrets unter 32 Bytes werden abgelehnt
    pub fn neu(geheimnis: &[u8], lebensdauer: Duration, uhr: Arc<dyn Uhr>) -> AuthResult<Self> {
        if geheimnis.len() < MIN_SECRET_BYTES {
            return Err(AuthError::validierung(format!(
                "JWT-Secret muss mindestens {MIN_SECRET_BYTES} Bytes lang sein"
            )));
        }

        let mut validierung = Validation::new(Algorithm::HS256);
        validierung.validate_exp = false;
        validierung.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(geheimnis),
            decoding: DecodingKey::from_secret(geheimnis),
            validierung,
            lebensdauer,
            uhr,
        })
    }

    pub fn lebensdauer(&self) -> Duration {
        self.lebensdauer
    }

    /// Stellt ein Token mit `exp = jetzt + lebensdauer` aus
    pub fn ausstellen(&self, konto_id: KontoId, email: &str, is_admin: bool) -> AuthResult<String> {
        let jetzt = self.uhr.jetzt();
        let claims = TokenClaims {
            sub: konto_id.inner(),
            email: email.to_string(),
            is_admin,
            iat: jetzt.timestamp(),
            exp: (jetzt + self.lebensdauer).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::intern(format!("Token konnte nicht signiert werden: {e}")))
    }

    /// Prueft Signatur und Ablauf
    ///
    /// Manipulierte oder unlesbare Tokens ergeben `TokenUngueltig`,
    /// abgelaufene `SessionAbgelaufen`.
    pub fn pruefen(&self, token: &str) -> AuthResult<TokenClaims> {
        let daten = decode::<TokenClaims>(token, &self.decoding, &self.validierung)
            .map_err(|e| {
                tracing::debug!(fehler = %e, "Token abgelehnt");
                AuthError::TokenUngueltig
            })?;

        if daten.claims.exp <= self.uhr.jetzt().timestamp() {
            return Err(AuthError::SessionAbgelaufen);
        }

        Ok(daten.claims)
    }
}
