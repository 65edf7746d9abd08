//! Zugriffsschutz fuer geschuetzte und Admin-Operationen
//!
//! Beide Waechter pruefen nur das Bearer-Token; der Admin-Waechter laedt
//! zusaetzlich das Konto frisch aus dem Store, damit ein entzogener
//! Admin-Status sofort wirkt. Bans werden hier nicht geprueft.

use std::sync::Arc;

use campushub_core::KontoId;
use campushub_db::KontoRepository;

use crate::error::{AuthError, AuthResult};
use crate::token::TokenDienst;

const BEARER_PRAEFIX: &str = "Bearer ";

/// Extrahiert das Token aus einem `Authorization`-Header
///
/// Fehlender Header oder falsches Schema ergibt `TokenFormat`,
/// ein leeres Token nach `"Bearer "` ergibt `TokenFehlt`.
pub fn bearer_extrahieren(header: Option<&str>) -> AuthResult<&str> {
    let wert = header.ok_or(AuthError::TokenFormat)?;
    let token = wert
        .strip_prefix(BEARER_PRAEFIX)
        .ok_or(AuthError::TokenFormat)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::TokenFehlt);
    }
    Ok(token)
}

pub struct Waechter<R: KontoRepository> {
    token_dienst: Arc<TokenDienst>,
    konto_repo: Arc<R>,
}

impl<R: KontoRepository> Waechter<R> {
    pub fn neu(token_dienst: Arc<TokenDienst>, konto_repo: Arc<R>) -> Arc<Self> {
        Arc::new(Self {
            token_dienst,
            konto_repo,
        })
    }

    /// Verlangt ein gueltiges, nicht abgelaufenes Token
    pub fn auth_erforderlich(&self, header: Option<&str>) -> AuthResult<KontoId> {
        let token = bearer_extrahieren(header)?;
        let claims = self.token_dienst.pruefen(token)?;
        Ok(claims.konto_id())
    }

    /// Verlangt ein gueltiges Token und aktuellen Admin-Status im Store
    ///
    /// Der `is_admin`-Claim im Token wird ignoriert.
    pub async fn admin_erforderlich(&self, header: Option<&str>) -> AuthResult<KontoId> {
        let konto_id = self.auth_erforderlich(header)?;

        match self.konto_repo.get_by_id(konto_id).await? {
            Some(konto) if konto.is_admin => Ok(konto_id),
            Some(_) => {
                tracing::warn!(konto_id = %konto_id, "Admin-Zugriff ohne Berechtigung");
                Err(AuthError::KeineBerechtigung)
            }
            None => {
                tracing::warn!(konto_id = %konto_id, "Admin-Zugriff mit Token eines geloeschten Kontos");
                Err(AuthError::KeineBerechtigung)
            }
        }
    }
}
