//! Axum-Extraktoren fuer angemeldete Konten
//!
//! Handler, die [`AuthKonto`] oder [`AdminKonto`] als Argument nehmen,
//! laufen nur, wenn der jeweilige Waechter das Bearer-Token akzeptiert.
//! Andernfalls antwortet der Extraktor direkt mit dem Fehler.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use campushub_core::KontoId;
use campushub_db::Datenbank;

use crate::{error::ApiError, state::ApiState};

/// Konto mit gueltigem Bearer-Token
#[derive(Debug, Clone, Copy)]
pub struct AuthKonto(pub KontoId);

/// Konto mit gueltigem Token und aktuellem Admin-Status im Store
#[derive(Debug, Clone, Copy)]
pub struct AdminKonto(pub KontoId);

fn authorization(parts: &Parts) -> Option<&str> {
    // Nicht-ASCII-Header werden wie ein fehlender Header behandelt
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

#[async_trait]
impl<R: Datenbank> FromRequestParts<ApiState<R>> for AuthKonto {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState<R>,
    ) -> Result<Self, Self::Rejection> {
        let id = state.waechter.auth_erforderlich(authorization(parts))?;
        Ok(Self(id))
    }
}

#[async_trait]
impl<R: Datenbank> FromRequestParts<ApiState<R>> for AdminKonto {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState<R>,
    ) -> Result<Self, Self::Rejection> {
        let id = state
            .waechter
            .admin_erforderlich(authorization(parts))
            .await?;
        Ok(Self(id))
    }
}
