//! SQLite-Implementierung des KontoRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campushub_core::KontoId;

use crate::error::DbError;
use crate::models::{KontoRecord, KontoUpdate, NeuesKonto};
use crate::repository::{DbResult, KontoRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{zeit_parsen, zeit_parsen_opt};

const KONTO_SPALTEN: &str = "user_id, email, password, is_admin, is_active, is_banned, \
     ban_reason, ban_until, last_login, created_at";

impl SqliteDb {
    async fn konto_oder_fehler(&self, id: KontoId) -> DbResult<KontoRecord> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))
    }
}

#[async_trait]
impl KontoRepository for SqliteDb {
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        let now = self.uhr.jetzt();

        let ergebnis = sqlx::query(
            "INSERT INTO users (email, password, is_admin, is_active, is_banned, created_at)
             VALUES (?, ?, ?, 1, 0, ?)",
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.is_admin as i64)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("unique") {
                DbError::Eindeutigkeit(format!("E-Mail '{}' bereits vergeben", data.email))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(KontoRecord {
            id: KontoId(ergebnis.last_insert_rowid()),
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            is_admin: data.is_admin,
            is_active: true,
            is_banned: false,
            ban_reason: None,
            ban_until: None,
            last_login: None,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: KontoId) -> DbResult<Option<KontoRecord>> {
        let sql = format!("SELECT {KONTO_SPALTEN} FROM users WHERE user_id = ?");
        let row = sqlx::query(&sql)
            .bind(id.inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>> {
        let sql = format!("SELECT {KONTO_SPALTEN} FROM users WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn update(&self, id: KontoId, data: KontoUpdate) -> DbResult<KontoRecord> {
        if data.ist_leer() {
            return self.konto_oder_fehler(id).await;
        }

        let mut sets: Vec<&str> = Vec::new();
        if data.is_admin.is_some() {
            sets.push("is_admin = ?");
        }
        if data.is_active.is_some() {
            sets.push("is_active = ?");
        }

        let sql = format!("UPDATE users SET {} WHERE user_id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);
        if let Some(v) = data.is_admin {
            q = q.bind(v as i64);
        }
        if let Some(v) = data.is_active {
            q = q.bind(v as i64);
        }
        q = q.bind(id.inner());

        let affected = q.execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }

        self.konto_oder_fehler(id).await
    }

    async fn delete(&self, id: KontoId) -> DbResult<bool> {
        // user_profiles haengt per ON DELETE CASCADE dran
        let affected = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(id.inner())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<KontoRecord>> {
        let sql = format!(
            "SELECT {KONTO_SPALTEN} FROM users ORDER BY created_at DESC, user_id DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_konto).collect()
    }

    async fn set_password_hash(&self, id: KontoId, hash: &str) -> DbResult<()> {
        let affected = sqlx::query("UPDATE users SET password = ? WHERE user_id = ?")
            .bind(hash)
            .bind(id.inner())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }
        Ok(())
    }

    async fn update_last_login(&self, id: KontoId, zeitpunkt: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE user_id = ?")
            .bind(zeitpunkt.to_rfc3339())
            .bind(id.inner())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_ban(
        &self,
        id: KontoId,
        grund: &str,
        bis: Option<DateTime<Utc>>,
    ) -> DbResult<KontoRecord> {
        let affected = sqlx::query(
            "UPDATE users SET is_banned = 1, ban_reason = ?, ban_until = ? WHERE user_id = ?",
        )
        .bind(grund)
        .bind(bis.map(|t| t.to_rfc3339()))
        .bind(id.inner())
        .execute(&self.pool)
        .await?
        .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }

        self.konto_oder_fehler(id).await
    }

    async fn clear_ban(&self, id: KontoId) -> DbResult<KontoRecord> {
        let affected = sqlx::query(
            "UPDATE users SET is_banned = 0, ban_reason = NULL, ban_until = NULL WHERE user_id = ?",
        )
        .bind(id.inner())
        .execute(&self.pool)
        .await?
        .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }

        self.konto_oder_fehler(id).await
    }
}

fn row_to_konto(row: &sqlx::sqlite::SqliteRow) -> DbResult<KontoRecord> {
    use sqlx::Row as _;

    let created_at: String = row.try_get("created_at")?;
    let is_admin: i64 = row.try_get("is_admin")?;
    let is_active: i64 = row.try_get("is_active")?;
    let is_banned: i64 = row.try_get("is_banned")?;

    Ok(KontoRecord {
        id: KontoId(row.try_get("user_id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        is_admin: is_admin != 0,
        is_active: is_active != 0,
        is_banned: is_banned != 0,
        ban_reason: row.try_get("ban_reason")?,
        ban_until: zeit_parsen_opt("ban_until", row.try_get("ban_until")?)?,
        last_login: zeit_parsen_opt("last_login", row.try_get("last_login")?)?,
        created_at: zeit_parsen("created_at", &created_at)?,
    })
}
