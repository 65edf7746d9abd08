//! Datenbankmodelle fuer CampusHub
//!
//! Diese Typen repraesentieren Datensaetze aus dem Credential-Store.
//! Sie sind reine Datenuebertragungsobjekte ohne Geschaeftslogik.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campushub_core::KontoId;

// ---------------------------------------------------------------------------
// Konten
// ---------------------------------------------------------------------------

/// Konto-Datensatz aus der Datenbank
///
/// Ist `is_banned` false, sind `ban_reason` und `ban_until` bedeutungslos
/// (koennen veraltet sein) und duerfen nicht ausgewertet werden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KontoRecord {
    pub id: KontoId,
    /// Immer kleingeschrieben gespeichert
    pub email: String,
    /// PHC-String (Argon2id) oder – bei Altbestaenden – Klartext
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    /// `None` bei gesetztem `is_banned` = permanenter Ban
    pub ban_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Kontos
#[derive(Debug, Clone)]
pub struct NeuesKonto<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
}

/// Daten zum Aktualisieren eines Kontos (nur gesetzte Felder werden geschrieben)
#[derive(Debug, Clone, Default)]
pub struct KontoUpdate {
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

impl KontoUpdate {
    pub fn ist_leer(&self) -> bool {
        self.is_admin.is_none() && self.is_active.is_none()
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Art des Profilfotos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FotoArt {
    Profile,
    Cover,
}

impl FotoArt {
    pub fn spalte(&self) -> &'static str {
        match self {
            Self::Profile => "profile_photo",
            Self::Cover => "cover_photo",
        }
    }
}

impl std::str::FromStr for FotoArt {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile" => Ok(Self::Profile),
            "cover" => Ok(Self::Cover),
            other => Err(format!("Unbekannte Foto-Art: {other}")),
        }
    }
}

/// Profil-Datensatz (1:1 zum Konto)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilRecord {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub department: Option<String>,
    pub grade: Option<String>,
    pub phone_number: Option<String>,
    pub profile_photo: Option<String>,
    pub cover_photo: Option<String>,
}

/// Zusammengesetzte Profilansicht (Konto + Profil), wie sie gecacht wird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilAnsicht {
    pub konto_id: KontoId,
    pub email: String,
    pub is_admin: bool,
    #[serde(flatten)]
    pub profil: ProfilRecord,
    pub created_at: DateTime<Utc>,
}

impl ProfilAnsicht {
    pub fn aus_teilen(konto: &KontoRecord, profil: ProfilRecord) -> Self {
        Self {
            konto_id: konto.id,
            email: konto.email.clone(),
            is_admin: konto.is_admin,
            profil,
            created_at: konto.created_at,
        }
    }

    /// Setzt genau ein Fotofeld
    pub fn foto_setzen(&mut self, art: FotoArt, url: &str) {
        let feld = match art {
            FotoArt::Profile => &mut self.profil.profile_photo,
            FotoArt::Cover => &mut self.profil.cover_photo,
        };
        *feld = Some(url.to_string());
    }
}

/// Daten zum Aktualisieren eines Profils (nur gesetzte Felder werden geschrieben)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub department: Option<String>,
    pub grade: Option<String>,
    pub phone_number: Option<String>,
}

impl ProfilUpdate {
    pub fn ist_leer(&self) -> bool {
        self.full_name.is_none()
            && self.bio.is_none()
            && self.department.is_none()
            && self.grade.is_none()
            && self.phone_number.is_none()
    }

    /// Wendet das Update auf einen bestehenden Profil-Datensatz an
    pub fn anwenden(&self, profil: &mut ProfilRecord) {
        if let Some(v) = &self.full_name {
            profil.full_name = Some(v.clone());
        }
        if let Some(v) = &self.bio {
            profil.bio = Some(v.clone());
        }
        if let Some(v) = &self.department {
            profil.department = Some(v.clone());
        }
        if let Some(v) = &self.grade {
            profil.grade = Some(v.clone());
        }
        if let Some(v) = &self.phone_number {
            profil.phone_number = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn konto() -> KontoRecord {
        KontoRecord {
            id: KontoId(1),
            email: "alice@x.edu".into(),
            password_hash: "hash".into(),
            is_admin: false,
            is_active: true,
            is_banned: false,
            ban_reason: None,
            ban_until: None,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn foto_art_parsen() {
        assert_eq!("profile".parse::<FotoArt>().unwrap(), FotoArt::Profile);
        assert_eq!("cover".parse::<FotoArt>().unwrap(), FotoArt::Cover);
        assert!("banner".parse::<FotoArt>().is_err());
    }

    #[test]
    fn foto_setzen_aendert_nur_ein_feld() {
        let mut ansicht = ProfilAnsicht::aus_teilen(
            &konto(),
            ProfilRecord {
                profile_photo: Some("alt.png".into()),
                cover_photo: Some("cover.png".into()),
                ..Default::default()
            },
        );
        ansicht.foto_setzen(FotoArt::Profile, "neu.png");
        assert_eq!(ansicht.profil.profile_photo.as_deref(), Some("neu.png"));
        assert_eq!(ansicht.profil.cover_photo.as_deref(), Some("cover.png"));
    }

    #[test]
    fn profil_update_anwenden() {
        let mut profil = ProfilRecord {
            full_name: Some("Alice".into()),
            bio: Some("Hallo".into()),
            ..Default::default()
        };
        let update = ProfilUpdate {
            bio: Some("Neu".into()),
            grade: Some("3".into()),
            ..Default::default()
        };
        assert!(!update.ist_leer());
        update.anwenden(&mut profil);
        assert_eq!(profil.full_name.as_deref(), Some("Alice"));
        assert_eq!(profil.bio.as_deref(), Some("Neu"));
        assert_eq!(profil.grade.as_deref(), Some("3"));
    }

    #[test]
    fn ansicht_wird_flach_serialisiert() {
        let ansicht = ProfilAnsicht::aus_teilen(
            &konto(),
            ProfilRecord {
                full_name: Some("Alice".into()),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&ansicht).unwrap();
        assert_eq!(json["full_name"], "Alice");
        assert_eq!(json["konto_id"], 1);
    }
}
