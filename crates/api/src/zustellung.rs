//! Zustellung von Passwort-Reset-Links
//!
//! Der Versandweg (SMTP, Queue, ...) ist austauschbar. Standard ist ein
//! Logeintrag, der den Link fuer den Betrieb ohne Mailserver sichtbar macht.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ZustellFehler(pub String);

#[async_trait]
pub trait ResetZustellung: Send + Sync {
    async fn zustellen(&self, email: &str, link: &str) -> Result<(), ZustellFehler>;
}

/// Schreibt den Reset-Link ins Log statt ihn zu versenden
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingZustellung;

#[async_trait]
impl ResetZustellung for LoggingZustellung {
    async fn zustellen(&self, email: &str, link: &str) -> Result<(), ZustellFehler> {
        tracing::info!(email = %email, link = %link, "Reset-Link erstellt (kein Versand konfiguriert)");
        Ok(())
    }
}
