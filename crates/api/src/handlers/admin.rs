//! REST-Handler fuer die Kontoverwaltung (nur Admins)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use campushub_auth::{AdminKontoAnsicht, AdminKontoDetails, AuthError, KontoAenderung};
use campushub_core::KontoId;
use campushub_db::{Datenbank, KontoUpdate, ProfilUpdate};

use crate::{error::ApiResult, extract::AdminKonto, state::ApiState};

pub async fn konten_listen<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(_): AdminKonto,
) -> ApiResult<Json<Vec<AdminKontoAnsicht>>> {
    Ok(Json(state.admin.konten_listen().await?))
}

#[derive(Debug, Deserialize)]
pub struct KontoErstellenBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

pub async fn konto_erstellen<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(actor): AdminKonto,
    Json(body): Json<KontoErstellenBody>,
) -> ApiResult<(StatusCode, Json<AdminKontoAnsicht>)> {
    let konto = state
        .admin
        .konto_erstellen(&body.email, &body.full_name, &body.password, body.is_admin)
        .await?;
    tracing::debug!(actor_id = %actor, konto_id = %konto.id, "Admin-Anlage abgeschlossen");
    Ok((StatusCode::CREATED, Json(konto)))
}

pub async fn konto_laden<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(_): AdminKonto,
    Path(id): Path<i64>,
) -> ApiResult<Json<AdminKontoDetails>> {
    Ok(Json(state.admin.konto_laden(KontoId(id)).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct KontoAendernBody {
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub profil: ProfilUpdate,
}

impl From<KontoAendernBody> for KontoAenderung {
    fn from(body: KontoAendernBody) -> Self {
        Self {
            konto: KontoUpdate {
                is_admin: body.is_admin,
                is_active: body.is_active,
            },
            profil: body.profil,
        }
    }
}

pub async fn konto_aktualisieren<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(_): AdminKonto,
    Path(id): Path<i64>,
    Json(body): Json<KontoAendernBody>,
) -> ApiResult<Json<AdminKontoDetails>> {
    let details = state
        .admin
        .konto_aktualisieren(KontoId(id), body.into())
        .await?;
    Ok(Json(details))
}

pub async fn konto_loeschen<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(actor): AdminKonto,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.admin.konto_loeschen(actor, KontoId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct BanBody {
    pub ban_reason: Option<String>,
    /// RFC 3339 oder `YYYY-MM-DDTHH:MM[:SS]` (als UTC); leer = permanent
    pub ban_until: Option<String>,
}

/// Liest das Ban-Ende aus dem Request
fn ban_ende_parsen(wert: Option<&str>) -> Result<Option<DateTime<Utc>>, AuthError> {
    let wert = match wert.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(w) => w,
    };

    if let Ok(zeit) = DateTime::parse_from_rfc3339(wert) {
        return Ok(Some(zeit.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(wert, format).ok())
        .map(|naiv| Some(naiv.and_utc()))
        .ok_or_else(|| AuthError::validierung(format!("Ungueltiges Ban-Ende: {wert}")))
}

pub async fn bannen<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(actor): AdminKonto,
    Path(id): Path<i64>,
    Json(body): Json<BanBody>,
) -> ApiResult<Json<AdminKontoDetails>> {
    let bis = ban_ende_parsen(body.ban_until.as_deref())?;
    let ziel = KontoId(id);
    state
        .bans
        .bannen(actor, ziel, body.ban_reason.as_deref(), bis)
        .await?;
    Ok(Json(state.admin.konto_laden(ziel).await?))
}

pub async fn entbannen<R: Datenbank>(
    State(state): State<ApiState<R>>,
    AdminKonto(_): AdminKonto,
    Path(id): Path<i64>,
) -> ApiResult<Json<AdminKontoDetails>> {
    let ziel = KontoId(id);
    state.bans.entbannen(ziel).await?;
    Ok(Json(state.admin.konto_laden(ziel).await?))
}
