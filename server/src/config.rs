//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte; nur das JWT-Secret muss gesetzt werden
//! (Datei oder `CH_JWT_SECRET`).

use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use campushub_auth::reset::{CLEANUP_INTERVALL, STANDARD_LEBENSDAUER_MINUTEN};
use campushub_api::STANDARD_PRUEFINTERVALL;
use campushub_auth::AuthOptionen;
use campushub_db::{DatabaseBackend, DatabaseConfig};
use campushub_observability::{log_format_gueltig, log_level_gueltig};

/// Ueberschreibt `[auth] jwt_secret`
pub const ENV_JWT_SECRET: &str = "CH_JWT_SECRET";

/// Mindestlaenge des JWT-Secrets in Bytes
pub const MIN_SECRET_LAENGE: usize = 32;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP-Einstellungen
    pub server: ServerEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Token, Passwort-Regeln, Reset
    pub auth: AuthEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken)
    pub observability: ObservabilityEinstellungen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
    /// CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec![],
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Backend: "sqlite" oder "memory"
    pub backend: String,
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            backend: "sqlite".into(),
            url: "sqlite://campushub.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HMAC-Secret fuer Bearer-Tokens, mindestens 32 Bytes
    pub jwt_secret: Option<String>,
    pub token_lebensdauer_stunden: i64,
    pub reset_lebensdauer_minuten: i64,
    /// Intervall der Bereinigung abgelaufener Reset-Tokens
    pub reset_cleanup_minuten: u64,
    /// Dem Reset-Token vorangestellt
    pub reset_link_basis: String,
    pub min_passwort_laenge: usize,
    /// Wird beim Start angelegt, falls die E-Mail noch frei ist
    pub start_admin_email: Option<String>,
    pub start_admin_passwort: Option<String>,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        let optionen = AuthOptionen::default();
        Self {
            jwt_secret: None,
            token_lebensdauer_stunden: 24,
            reset_lebensdauer_minuten: STANDARD_LEBENSDAUER_MINUTEN,
            reset_cleanup_minuten: CLEANUP_INTERVALL.as_secs() / 60,
            reset_link_basis: optionen.reset_link_basis,
            min_passwort_laenge: optionen.min_passwort_laenge,
            start_admin_email: None,
            start_admin_passwort: None,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level oder EnvFilter-Direktive
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Stellt `/metrics` bereit
    pub metriken_aktiviert: bool,
    /// Abstand der DB-Pruefung fuer `/health`
    pub db_pruefintervall_sekunden: u64,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            metriken_aktiviert: true,
            db_pruefintervall_sekunden: STANDARD_PRUEFINTERVALL.as_secs(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config
                    .validieren()
                    .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow!("Konfigurationsdatei '{pfad}' nicht lesbar: {e}")),
        }
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            return Err(anyhow!("Ungueltiges Log-Level '{}'", self.logging.level));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(anyhow!(
                "Ungueltiges Log-Format '{}' (erwartet: text | json)",
                self.logging.format
            ));
        }
        Ok(())
    }

    pub fn bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        let adresse = format!("{}:{}", self.server.bind_adresse, self.server.port);
        adresse
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{adresse}'"))
    }

    pub fn datenbank_config(&self) -> anyhow::Result<DatabaseConfig> {
        let backend: DatabaseBackend = self.datenbank.backend.parse().map_err(|e| anyhow!("{e}"))?;
        Ok(DatabaseConfig {
            backend,
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
        })
    }

    /// Waehlt das JWT-Secret; die Umgebung hat Vorrang vor der Datei
    pub fn jwt_secret(&self, aus_env: Option<String>) -> anyhow::Result<String> {
        let secret = aus_env
            .filter(|s| !s.is_empty())
            .or_else(|| self.auth.jwt_secret.clone())
            .ok_or_else(|| {
                anyhow!("Kein JWT-Secret konfiguriert ([auth] jwt_secret oder {ENV_JWT_SECRET})")
            })?;

        if secret.len() < MIN_SECRET_LAENGE {
            return Err(anyhow!(
                "JWT-Secret zu kurz: {} Bytes, mindestens {MIN_SECRET_LAENGE}",
                secret.len()
            ));
        }
        Ok(secret)
    }

    pub fn auth_optionen(&self) -> AuthOptionen {
        AuthOptionen {
            min_passwort_laenge: self.auth.min_passwort_laenge,
            reset_link_basis: self.auth.reset_link_basis.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANGES_SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.datenbank.backend, "sqlite");
        assert_eq!(cfg.auth.token_lebensdauer_stunden, 24);
        assert_eq!(cfg.auth.reset_lebensdauer_minuten, 60);
        assert_eq!(cfg.auth.reset_cleanup_minuten, 15);
        assert_eq!(cfg.auth.min_passwort_laenge, 6);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.observability.metriken_aktiviert);
        assert_eq!(cfg.bind_adresse().unwrap().port(), 8000);
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            port = 9000
            cors_origins = ["http://localhost:5173"]

            [datenbank]
            backend = "memory"

            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            min_passwort_laenge = 8
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(
            cfg.datenbank_config().unwrap().backend,
            DatabaseBackend::Memory
        );
        assert_eq!(cfg.auth_optionen().min_passwort_laenge, 8);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.server.bind_adresse, "0.0.0.0");
        assert_eq!(cfg.auth.token_lebensdauer_stunden, 24);
    }

    #[test]
    fn unbekanntes_backend() {
        let mut cfg = ServerConfig::default();
        cfg.datenbank.backend = "postgres".into();
        assert!(cfg.datenbank_config().is_err());
    }

    #[test]
    fn jwt_secret_env_hat_vorrang() {
        let mut cfg = ServerConfig::default();
        cfg.auth.jwt_secret = Some(LANGES_SECRET.into());

        let env = "fedcba9876543210fedcba9876543210".to_string();
        assert_eq!(cfg.jwt_secret(Some(env.clone())).unwrap(), env);
        assert_eq!(cfg.jwt_secret(None).unwrap(), LANGES_SECRET);
        // Leere Umgebungsvariable zaehlt als nicht gesetzt
        assert_eq!(cfg.jwt_secret(Some(String::new())).unwrap(), LANGES_SECRET);
    }

    #[test]
    fn jwt_secret_fehlt_oder_zu_kurz() {
        let mut cfg = ServerConfig::default();
        assert!(cfg.jwt_secret(None).is_err());

        cfg.auth.jwt_secret = Some("kurz".into());
        assert!(cfg.jwt_secret(None).is_err());
    }

    #[test]
    fn logging_werte_werden_geprueft() {
        let mut cfg = ServerConfig::default();
        cfg.validieren().unwrap();

        cfg.logging.level = "info,campushub_auth=debug".into();
        cfg.validieren().unwrap();

        cfg.logging.level = "laut".into();
        assert!(cfg.validieren().is_err());

        cfg.logging.level = "info".into();
        cfg.logging.format = "xml".into();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn laden_lehnt_ungueltiges_logging_ab() {
        let pfad = std::env::temp_dir().join(format!(
            "campushub-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&pfad, "[logging]\nformat = \"xml\"\n").unwrap();
        let ergebnis = ServerConfig::laden(pfad.to_str().unwrap());
        std::fs::remove_file(&pfad).unwrap();
        assert!(ergebnis.is_err());
    }

    #[test]
    fn laden_ohne_datei_liefert_standard() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/campushub.toml").unwrap();
        assert_eq!(cfg.server.port, 8000);
    }
}
