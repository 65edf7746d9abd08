//! Passwort-Reset-Tokens
//!
//! Reset-Tokens werden nur im Speicher gehalten und gehen bei einem
//! Neustart verloren. Ein Token ist einmal einloesbar; abgelaufene Tokens
//! werden beim Zugriff oder durch den Cleanup-Task entfernt.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::RngCore;

use campushub_core::Uhr;

use crate::error::{AuthError, AuthResult};

/// Standard-Lebensdauer eines Reset-Tokens: 1 Stunde
pub const STANDARD_LEBENSDAUER_MINUTEN: i64 = 60;

/// Intervall fuer den automatischen Cleanup-Task: 15 Minuten
pub const CLEANUP_INTERVALL: Duration = Duration::from_secs(15 * 60);

/// Ein entnommenes, noch gueltiges Token
#[derive(Debug, Clone)]
pub(crate) struct ResetEintrag {
    pub(crate) email: String,
    laeuft_ab_am: DateTime<Utc>,
}

pub struct ResetStore {
    /// token -> Eintrag
    eintraege: Mutex<HashMap<String, ResetEintrag>>,
    lebensdauer: chrono::Duration,
    uhr: Arc<dyn Uhr>,
}

impl ResetStore {
    pub fn neu(lebensdauer: chrono::Duration, uhr: Arc<dyn Uhr>) -> Arc<Self> {
        Arc::new(Self {
            eintraege: Mutex::new(HashMap::new()),
            lebensdauer,
            uhr,
        })
    }

    /// Startet den periodischen Cleanup als tokio-Task
    pub fn cleanup_task_starten(
        store: Arc<Self>,
        intervall: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(intervall).await;
                let entfernt = store.cleanup_abgelaufene();
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Reset-Tokens bereinigt");
                }
            }
        })
    }

    /// Erstellt ein neues Token fuer die (normalisierte) E-Mail
    pub fn erstellen(&self, email: &str) -> String {
        let token = token_generieren();
        let eintrag = ResetEintrag {
            email: email.to_string(),
            laeuft_ab_am: self.uhr.jetzt() + self.lebensdauer,
        };
        self.eintraege.lock().insert(token.clone(), eintrag);
        token
    }

    /// Prueft ein Token ohne es zu verbrauchen
    ///
    /// Abgelaufene Tokens werden dabei entfernt.
    pub fn pruefen(&self, token: &str) -> AuthResult<String> {
        let jetzt = self.uhr.jetzt();
        let mut eintraege = self.eintraege.lock();
        let gueltig = eintraege
            .get(token)
            .map(|e| (jetzt < e.laeuft_ab_am).then(|| e.email.clone()))
            .ok_or(AuthError::ResetTokenUngueltig)?;

        gueltig.ok_or_else(|| {
            eintraege.remove(token);
            AuthError::ResetTokenUngueltig
        })
    }

    /// Loest ein Token ein und gibt die zugehoerige E-Mail zurueck
    ///
    /// Das Token ist danach verbraucht, auch wenn es abgelaufen war.
    pub fn einloesen(&self, token: &str) -> AuthResult<String> {
        self.entnehmen(token).map(|eintrag| eintrag.email)
    }

    /// Entnimmt ein Token exklusiv
    ///
    /// Von zwei gleichzeitigen Aufrufen bekommt genau einer den Eintrag.
    /// Abgelaufene Eintraege werden verworfen.
    pub(crate) fn entnehmen(&self, token: &str) -> AuthResult<ResetEintrag> {
        let eintrag = self
            .eintraege
            .lock()
            .remove(token)
            .ok_or(AuthError::ResetTokenUngueltig)?;

        if self.uhr.jetzt() >= eintrag.laeuft_ab_am {
            return Err(AuthError::ResetTokenUngueltig);
        }
        Ok(eintrag)
    }

    /// Legt ein entnommenes Token mit unveraendertem Ablauf zurueck
    pub(crate) fn zuruecklegen(&self, token: &str, eintrag: ResetEintrag) {
        self.eintraege.lock().insert(token.to_string(), eintrag);
    }

    /// Entfernt abgelaufene Tokens und gibt deren Anzahl zurueck
    pub fn cleanup_abgelaufene(&self) -> usize {
        let jetzt = self.uhr.jetzt();
        let mut eintraege = self.eintraege.lock();
        let vorher = eintraege.len();
        eintraege.retain(|_, e| e.laeuft_ab_am > jetzt);
        vorher - eintraege.len()
    }

    pub fn anzahl(&self) -> usize {
        self.eintraege.lock().len()
    }
}

/// 32 Zufallsbytes als URL-sicheres Base64
fn token_generieren() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}
