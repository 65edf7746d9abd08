//! Fehlerantworten der REST-API
//!
//! Format: `{"error": {"code": <HTTP-Status>, "kind": "...", "message": "..."}}`,
//! bei Bans zusaetzlich `reason` und `remaining`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use campushub_auth::AuthError;

use crate::zustellung::ZustellFehler;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Reset-Link konnte nicht zugestellt werden: {0}")]
    Zustellung(#[from] ZustellFehler),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Auth(e) => auth_status(e),
            Self::Zustellung(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn art(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.art(),
            Self::Zustellung(_) => "delivery",
        }
    }

    fn koerper(&self) -> Value {
        let status = self.http_status();
        let mut fehler = Map::new();
        fehler.insert("code".into(), json!(status.as_u16()));
        fehler.insert("kind".into(), json!(self.art()));

        // Interne Details bleiben im Log
        let nachricht = if status.is_server_error() {
            "Interner Serverfehler".to_string()
        } else {
            self.to_string()
        };
        fehler.insert("message".into(), json!(nachricht));

        if let Self::Auth(AuthError::BenutzerGebannt { grund, restdauer }) = self {
            fehler.insert("reason".into(), json!(grund));
            fehler.insert("remaining".into(), json!(restdauer));
        }
        json!({ "error": fehler })
    }
}

fn auth_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::Validierung(_)
        | AuthError::PasswortZuKurz(_)
        | AuthError::ResetTokenUngueltig => StatusCode::BAD_REQUEST,
        AuthError::NichtGefunden(_) => StatusCode::NOT_FOUND,
        AuthError::TokenFehlt
        | AuthError::TokenFormat
        | AuthError::SessionAbgelaufen
        | AuthError::TokenUngueltig
        | AuthError::UngueltigeAnmeldedaten => StatusCode::UNAUTHORIZED,
        AuthError::KeineBerechtigung
        | AuthError::BenutzerGebannt { .. }
        | AuthError::BenutzerGesperrt => StatusCode::FORBIDDEN,
        AuthError::EmailVergeben(_) => StatusCode::CONFLICT,
        AuthError::PasswortHashing(_) | AuthError::Datenbank(_) | AuthError::Intern(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(kind = self.art(), fehler = %self, "Anfrage fehlgeschlagen");
        }
        (status, Json(self.koerper())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campushub_auth::Restdauer;
    use campushub_db::DbError;

    #[test]
    fn token_fehler_sind_401_mit_eigener_art() {
        let arten: Vec<_> = [
            AuthError::TokenFehlt,
            AuthError::TokenFormat,
            AuthError::SessionAbgelaufen,
            AuthError::TokenUngueltig,
        ]
        .into_iter()
        .map(ApiError::from)
        .map(|e| {
            assert_eq!(e.http_status(), StatusCode::UNAUTHORIZED);
            e.art()
        })
        .collect();

        let mut eindeutig = arten.clone();
        eindeutig.sort_unstable();
        eindeutig.dedup();
        assert_eq!(arten.len(), eindeutig.len());
    }

    #[test]
    fn ban_koerper_enthaelt_grund_und_restdauer() {
        let e = ApiError::from(AuthError::BenutzerGebannt {
            grund: "spam".into(),
            restdauer: Some(Restdauer::aus_sekunden(90_061)),
        });
        assert_eq!(e.http_status(), StatusCode::FORBIDDEN);

        let koerper = e.koerper();
        assert_eq!(koerper["error"]["kind"], "banned");
        assert_eq!(koerper["error"]["reason"], "spam");
        assert_eq!(koerper["error"]["remaining"]["tage"], 1);
        assert_eq!(koerper["error"]["remaining"]["stunden"], 1);
        assert_eq!(koerper["error"]["remaining"]["minuten"], 1);
    }

    #[test]
    fn permanenter_ban_hat_keine_restdauer() {
        let e = ApiError::from(AuthError::BenutzerGebannt {
            grund: "spam".into(),
            restdauer: None,
        });
        assert!(e.koerper()["error"]["remaining"].is_null());
    }

    #[test]
    fn store_fehler_verraet_keine_details() {
        let e = ApiError::from(AuthError::Datenbank(DbError::intern("tabelle kaputt")));
        assert_eq!(e.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        let koerper = e.koerper();
        assert_eq!(koerper["error"]["kind"], "storage");
        assert_eq!(koerper["error"]["code"], 500);
        assert!(!koerper["error"]["message"]
            .as_str()
            .unwrap()
            .contains("tabelle"));
    }

    #[test]
    fn weitere_zuordnungen() {
        let faelle = [
            (AuthError::PasswortZuKurz(6), StatusCode::BAD_REQUEST),
            (AuthError::ResetTokenUngueltig, StatusCode::BAD_REQUEST),
            (AuthError::NichtGefunden("x".into()), StatusCode::NOT_FOUND),
            (AuthError::UngueltigeAnmeldedaten, StatusCode::UNAUTHORIZED),
            (AuthError::KeineBerechtigung, StatusCode::FORBIDDEN),
            (AuthError::BenutzerGesperrt, StatusCode::FORBIDDEN),
            (AuthError::EmailVergeben("a@x.edu".into()), StatusCode::CONFLICT),
        ];
        for (fehler, status) in faelle {
            assert_eq!(ApiError::from(fehler).http_status(), status);
        }
    }
}
