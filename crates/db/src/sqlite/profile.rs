//! SQLite-Implementierung des ProfilRepository

use async_trait::async_trait;

use campushub_core::KontoId;

use crate::error::DbError;
use crate::models::{FotoArt, ProfilAnsicht, ProfilRecord, ProfilUpdate};
use crate::repository::{DbResult, ProfilRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::zeit_parsen;

#[async_trait]
impl ProfilRepository for SqliteDb {
    async fn create_profile(&self, id: KontoId, full_name: &str) -> DbResult<()> {
        sqlx::query("INSERT INTO user_profiles (user_id, full_name) VALUES (?, ?)")
            .bind(id.inner())
            .bind(full_name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE") || msg.contains("PRIMARY KEY") {
                    DbError::Eindeutigkeit(format!("Profil fuer {id} existiert bereits"))
                } else {
                    DbError::Sqlx(e)
                }
            })?;
        Ok(())
    }

    async fn load_profile_view(&self, id: KontoId) -> DbResult<Option<ProfilAnsicht>> {
        let row = sqlx::query(
            "SELECT u.user_id, u.email, u.is_admin, u.created_at,
                    p.full_name, p.bio, p.department, p.grade, p.phone_number,
                    p.profile_photo, p.cover_photo
             FROM users u
             LEFT JOIN user_profiles p ON p.user_id = u.user_id
             WHERE u.user_id = ?",
        )
        .bind(id.inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_ansicht(&r)).transpose()
    }

    async fn update_profile(&self, id: KontoId, data: ProfilUpdate) -> DbResult<()> {
        if data.ist_leer() {
            return Ok(());
        }

        // Fehlende Profilzeile wird angelegt (Altbestaende ohne Profil)
        sqlx::query("INSERT OR IGNORE INTO user_profiles (user_id) VALUES (?)")
            .bind(id.inner())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("FOREIGN KEY") {
                    DbError::nicht_gefunden(id.to_string())
                } else {
                    DbError::Sqlx(e)
                }
            })?;

        let mut sets: Vec<&str> = Vec::new();
        let mut werte: Vec<&String> = Vec::new();
        for (spalte, wert) in [
            ("full_name = ?", &data.full_name),
            ("bio = ?", &data.bio),
            ("department = ?", &data.department),
            ("grade = ?", &data.grade),
            ("phone_number = ?", &data.phone_number),
        ] {
            if let Some(v) = wert {
                sets.push(spalte);
                werte.push(v);
            }
        }

        let sql = format!("UPDATE user_profiles SET {} WHERE user_id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);
        for v in werte {
            q = q.bind(v);
        }
        q.bind(id.inner()).execute(&self.pool).await?;
        Ok(())
    }

    async fn set_photo(&self, id: KontoId, art: FotoArt, url: &str) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO user_profiles (user_id, {spalte}) VALUES (?, ?)
             ON CONFLICT(user_id) DO UPDATE SET {spalte} = excluded.{spalte}",
            spalte = art.spalte()
        );
        sqlx::query(&sql)
            .bind(id.inner())
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("FOREIGN KEY") {
                    DbError::nicht_gefunden(id.to_string())
                } else {
                    DbError::Sqlx(e)
                }
            })?;
        Ok(())
    }
}

fn row_to_ansicht(row: &sqlx::sqlite::SqliteRow) -> DbResult<ProfilAnsicht> {
    use sqlx::Row as _;

    let created_at: String = row.try_get("created_at")?;
    let is_admin: i64 = row.try_get("is_admin")?;

    Ok(ProfilAnsicht {
        konto_id: KontoId(row.try_get("user_id")?),
        email: row.try_get("email")?,
        is_admin: is_admin != 0,
        profil: ProfilRecord {
            full_name: row.try_get("full_name")?,
            bio: row.try_get("bio")?,
            department: row.try_get("department")?,
            grade: row.try_get("grade")?,
            phone_number: row.try_get("phone_number")?,
            profile_photo: row.try_get("profile_photo")?,
            cover_photo: row.try_get("cover_photo")?,
        },
        created_at: zeit_parsen("created_at", &created_at)?,
    })
}
