//! REST-Handler fuer Registrierung, Login und Passwort-Reset

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use campushub_auth::{email_normalisieren, Anmeldung, AuthError, KontoZusammenfassung};
use campushub_db::Datenbank;
use campushub_observability::LoginErgebnis;

use crate::{error::ApiResult, state::ApiState};

#[derive(Debug, Deserialize)]
pub struct RegistrierungBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
}

pub async fn registrieren<R: Datenbank>(
    State(state): State<ApiState<R>>,
    Json(body): Json<RegistrierungBody>,
) -> ApiResult<(StatusCode, Json<KontoZusammenfassung>)> {
    let konto = state
        .auth
        .registrieren(&body.email, &body.full_name, &body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(KontoZusammenfassung::from(&konto))))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn login_ergebnis(ergebnis: &Result<Anmeldung, AuthError>) -> Option<LoginErgebnis> {
    match ergebnis {
        Ok(_) => Some(LoginErgebnis::Erfolg),
        Err(AuthError::UngueltigeAnmeldedaten) => Some(LoginErgebnis::UngueltigeAnmeldedaten),
        Err(AuthError::BenutzerGebannt { .. }) => Some(LoginErgebnis::Gebannt),
        Err(AuthError::BenutzerGesperrt) => Some(LoginErgebnis::Gesperrt),
        // Leere Eingaben sind kein Login-Versuch
        Err(AuthError::Validierung(_)) => None,
        Err(_) => Some(LoginErgebnis::Fehler),
    }
}

pub async fn anmelden<R: Datenbank>(
    State(state): State<ApiState<R>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<Anmeldung>> {
    let ergebnis = state.auth.anmelden(&body.email, &body.password).await;
    if let Some(art) = login_ergebnis(&ergebnis) {
        state.metriken.login_zaehlen(art);
    }
    Ok(Json(ergebnis?))
}

#[derive(Debug, Deserialize)]
pub struct ResetAnfrageBody {
    #[serde(default)]
    pub email: String,
}

pub async fn reset_anfordern<R: Datenbank>(
    State(state): State<ApiState<R>>,
    Json(body): Json<ResetAnfrageBody>,
) -> ApiResult<Json<Value>> {
    let link = state.auth.passwort_reset_anfordern(&body.email).await?;
    state
        .zustellung
        .zustellen(&email_normalisieren(&body.email), &link)
        .await?;
    Ok(Json(json!({ "message": "Link zum Zuruecksetzen wurde versendet" })))
}

#[derive(Debug, Deserialize)]
pub struct ResetBody {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

pub async fn zuruecksetzen<R: Datenbank>(
    State(state): State<ApiState<R>>,
    Json(body): Json<ResetBody>,
) -> ApiResult<Json<Value>> {
    state
        .auth
        .passwort_zuruecksetzen(&body.token, &body.password)
        .await?;
    Ok(Json(json!({ "message": "Passwort wurde zurueckgesetzt" })))
}
