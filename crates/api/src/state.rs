//! Geteilter Axum-State der REST-API

use std::sync::Arc;

use campushub_auth::{
    AdminService, AuthOptionen, AuthService, BanService, ProfilCache, ProfilService, ResetStore,
    TokenDienst, Waechter,
};
use campushub_core::Uhr;
use campushub_db::Datenbank;
use campushub_observability::{CampusHubMetrics, HealthState};

use crate::zustellung::{LoggingZustellung, ResetZustellung};

/// Alle Dienste, die die Handler brauchen
///
/// Die Dienste sind ueber `Arc` geteilt; ein Klon des States ist billig.
pub struct ApiState<R: Datenbank> {
    pub auth: Arc<AuthService<R>>,
    pub admin: Arc<AdminService<R>>,
    pub bans: Arc<BanService<R>>,
    pub profile: Arc<ProfilService<R>>,
    pub waechter: Arc<Waechter<R>>,
    pub metriken: CampusHubMetrics,
    pub health: HealthState,
    pub zustellung: Arc<dyn ResetZustellung>,
}

// Manuell, da `derive(Clone)` ein `R: Clone` verlangen wuerde
impl<R: Datenbank> Clone for ApiState<R> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            admin: self.admin.clone(),
            bans: self.bans.clone(),
            profile: self.profile.clone(),
            waechter: self.waechter.clone(),
            metriken: self.metriken.clone(),
            health: self.health.clone(),
            zustellung: self.zustellung.clone(),
        }
    }
}

impl<R: Datenbank> ApiState<R> {
    /// Verdrahtet alle Dienste ueber einem gemeinsamen Store
    pub fn neu(
        repo: Arc<R>,
        uhr: Arc<dyn Uhr>,
        token_dienst: Arc<TokenDienst>,
        reset_store: Arc<ResetStore>,
        optionen: AuthOptionen,
        metriken: CampusHubMetrics,
    ) -> Self {
        let bans = BanService::neu(repo.clone(), uhr.clone());
        let profile = ProfilService::neu(repo.clone(), Arc::new(ProfilCache::neu()));
        let waechter = Waechter::neu(token_dienst.clone(), repo.clone());
        let admin = AdminService::neu(
            repo.clone(),
            bans.clone(),
            profile.clone(),
            optionen.min_passwort_laenge,
        );
        let auth = AuthService::neu(repo, token_dienst, bans.clone(), reset_store, uhr, optionen);

        Self {
            auth,
            admin,
            bans,
            profile,
            waechter,
            metriken,
            health: HealthState::neu(env!("CARGO_PKG_VERSION")),
            zustellung: Arc::new(LoggingZustellung),
        }
    }

    pub fn mit_zustellung(mut self, zustellung: Arc<dyn ResetZustellung>) -> Self {
        self.zustellung = zustellung;
        self
    }

    pub fn mit_health(mut self, health: HealthState) -> Self {
        self.health = health;
        self
    }
}
