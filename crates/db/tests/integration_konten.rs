//! Integration-Tests fuer KontoRepository (In-Memory SQLite)

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use campushub_core::{TestUhr, Uhr};
use campushub_db::{DbError, KontoRepository, KontoUpdate, NeuesKonto, SqliteDb};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

fn neues<'a>(email: &'a str, hash: &'a str) -> NeuesKonto<'a> {
    NeuesKonto {
        email,
        password_hash: hash,
        is_admin: false,
    }
}

#[tokio::test]
async fn ping_auf_offenem_pool() {
    db().await.ping().await.unwrap();
}

#[tokio::test]
async fn created_at_kommt_aus_der_uhr() {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let uhr = Arc::new(TestUhr::neu(start));
    let db = db().await.mit_uhr(uhr.clone());

    let erstes = db.create(neues("a@x.edu", "h")).await.unwrap();
    uhr.vorstellen(Duration::hours(5));
    let zweites = db.create(neues("b@x.edu", "h")).await.unwrap();

    assert_eq!(erstes.created_at, start);
    assert_eq!(zweites.created_at, uhr.jetzt());
    let gespeichert = db.get_by_id(zweites.id).await.unwrap().unwrap();
    assert_eq!(gespeichert.created_at, start + Duration::hours(5));
}

#[tokio::test]
async fn konto_erstellen_und_laden() {
    let db = db().await;

    let konto = db.create(neues("alice@x.edu", "$argon2id$...")).await.unwrap();
    assert!(konto.is_active);
    assert!(!konto.is_banned);
    assert!(konto.last_login.is_none());

    let per_id = db.get_by_id(konto.id).await.unwrap().unwrap();
    assert_eq!(per_id, konto);

    let per_email = db.get_by_email("alice@x.edu").await.unwrap().unwrap();
    assert_eq!(per_email.id, konto.id);
    assert!(db.get_by_email("bob@x.edu").await.unwrap().is_none());
}

#[tokio::test]
async fn doppelte_email_ist_eindeutigkeitsfehler() {
    let db = db().await;
    db.create(neues("alice@x.edu", "h")).await.unwrap();

    let err = db.create(neues("alice@x.edu", "h2")).await.unwrap_err();
    assert!(matches!(err, DbError::Eindeutigkeit(_)));
}

#[tokio::test]
async fn ban_setzen_und_aufheben() {
    let db = db().await;
    let konto = db.create(neues("troll@x.edu", "h")).await.unwrap();
    let bis = Utc::now() + Duration::days(2);

    let gebannt = db.set_ban(konto.id, "spam", Some(bis)).await.unwrap();
    assert!(gebannt.is_banned);
    assert_eq!(gebannt.ban_reason.as_deref(), Some("spam"));
    assert_eq!(gebannt.ban_until.map(|t| t.timestamp()), Some(bis.timestamp()));

    let frei = db.clear_ban(konto.id).await.unwrap();
    assert!(!frei.is_banned);
    assert!(frei.ban_reason.is_none());
    assert!(frei.ban_until.is_none());
}

#[tokio::test]
async fn permanenter_ban_ohne_ablauf() {
    let db = db().await;
    let konto = db.create(neues("perma@x.edu", "h")).await.unwrap();

    let gebannt = db.set_ban(konto.id, "Unbekannter Grund", None).await.unwrap();
    assert!(gebannt.is_banned);
    assert!(gebannt.ban_until.is_none());
}

#[tokio::test]
async fn update_und_passwort() {
    let db = db().await;
    let konto = db.create(neues("carol@x.edu", "klartext")).await.unwrap();

    let neu = db
        .update(
            konto.id,
            KontoUpdate {
                is_admin: Some(true),
                is_active: None,
            },
        )
        .await
        .unwrap();
    assert!(neu.is_admin);
    assert!(neu.is_active);

    db.set_password_hash(konto.id, "$argon2id$neu").await.unwrap();
    let geladen = db.get_by_id(konto.id).await.unwrap().unwrap();
    assert_eq!(geladen.password_hash, "$argon2id$neu");

    let jetzt = Utc::now();
    db.update_last_login(konto.id, jetzt).await.unwrap();
    let geladen = db.get_by_id(konto.id).await.unwrap().unwrap();
    assert_eq!(geladen.last_login.map(|t| t.timestamp()), Some(jetzt.timestamp()));
}

#[tokio::test]
async fn unbekanntes_konto_ist_nicht_gefunden() {
    let db = db().await;
    let id = campushub_core::KontoId(999);

    assert!(matches!(
        db.set_ban(id, "x", None).await,
        Err(DbError::NichtGefunden(_))
    ));
    assert!(matches!(
        db.update(id, KontoUpdate { is_admin: Some(true), is_active: None }).await,
        Err(DbError::NichtGefunden(_))
    ));
    assert!(!db.delete(id).await.unwrap());
}

#[tokio::test]
async fn liste_neueste_zuerst() {
    let db = db().await;
    let a = db.create(neues("a@x.edu", "h")).await.unwrap();
    let b = db.create(neues("b@x.edu", "h")).await.unwrap();

    let liste = db.list().await.unwrap();
    assert_eq!(liste.len(), 2);
    assert_eq!(liste[0].id, b.id);
    assert_eq!(liste[1].id, a.id);
}
