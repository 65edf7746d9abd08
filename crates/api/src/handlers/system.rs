//! Betriebsendpunkte

use axum::{extract::State, response::Response};

use campushub_db::Datenbank;
use campushub_observability::metriken_antwort;

use crate::state::ApiState;

/// GET /metrics – Cache-Zaehler werden vor dem Export nachgezogen
pub async fn metriken<R: Datenbank>(State(state): State<ApiState<R>>) -> Response {
    let cache = state.profile.cache();
    state
        .metriken
        .cache_zaehler_angleichen(cache.treffer(), cache.fehlgriffe());
    metriken_antwort(&state.metriken)
}
