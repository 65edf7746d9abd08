//! Route-Definitionen fuer die REST-API (/api/...)

use axum::{
    routing::{get, post, put},
    Router,
};

use campushub_db::Datenbank;
use campushub_observability::health_router;

use crate::{handlers, state::ApiState};

/// Erstellt den vollstaendigen Router samt `/health` und optional `/metrics`
pub fn api_router<R: Datenbank>(state: ApiState<R>, metriken_aktiviert: bool) -> Router {
    let health = health_router(state.health.clone());

    let mut router = Router::new()
        // Anmeldung
        .route("/api/auth/register", post(handlers::auth::registrieren::<R>))
        .route("/api/auth/login", post(handlers::auth::anmelden::<R>))
        .route(
            "/api/auth/password/forgot",
            post(handlers::auth::reset_anfordern::<R>),
        )
        .route(
            "/api/auth/password/reset",
            post(handlers::auth::zuruecksetzen::<R>),
        )
        // Profile
        .route(
            "/api/profile",
            get(handlers::profil::eigenes_profil::<R>)
                .put(handlers::profil::profil_aktualisieren::<R>),
        )
        .route(
            "/api/profile/photo",
            put(handlers::profil::foto_aktualisieren::<R>),
        )
        .route(
            "/api/users/:id/profile",
            get(handlers::profil::fremdes_profil::<R>),
        )
        // Admin
        .route(
            "/api/admin/users",
            get(handlers::admin::konten_listen::<R>).post(handlers::admin::konto_erstellen::<R>),
        )
        .route(
            "/api/admin/users/:id",
            get(handlers::admin::konto_laden::<R>)
                .put(handlers::admin::konto_aktualisieren::<R>)
                .delete(handlers::admin::konto_loeschen::<R>),
        )
        .route("/api/admin/users/:id/ban", post(handlers::admin::bannen::<R>))
        .route(
            "/api/admin/users/:id/unban",
            post(handlers::admin::entbannen::<R>),
        );

    if metriken_aktiviert {
        router = router.route("/metrics", get(handlers::system::metriken::<R>));
    }

    router.with_state(state).merge(health)
}
