//! REST-Handler fuer Profile

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use campushub_core::KontoId;
use campushub_db::{Datenbank, FotoArt, ProfilAnsicht, ProfilUpdate};

use crate::{error::ApiResult, extract::AuthKonto, state::ApiState};

pub async fn eigenes_profil<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AuthKonto(id): AuthKonto,
) -> ApiResult<Json<ProfilAnsicht>> {
    Ok(Json(state.profile.profil_laden(id).await?))
}

pub async fn profil_aktualisieren<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AuthKonto(id): AuthKonto,
    Json(update): Json<ProfilUpdate>,
) -> ApiResult<Json<ProfilAnsicht>> {
    Ok(Json(state.profile.profil_aktualisieren(id, update).await?))
}

#[derive(Debug, Deserialize)]
pub struct FotoBody {
    #[serde(rename = "type")]
    pub art: FotoArt,
    pub url: String,
}

pub async fn foto_aktualisieren<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AuthKonto(id): AuthKonto,
    Json(body): Json<FotoBody>,
) -> ApiResult<StatusCode> {
    state
        .profile
        .foto_aktualisieren(id, body.art, &body.url)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Profil eines anderen Kontos; jede angemeldete Person darf es lesen
pub async fn fremdes_profil<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AuthKonto(_): AuthKonto,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProfilAnsicht>> {
    Ok(Json(state.profile.profil_laden(KontoId(id)).await?))
}
