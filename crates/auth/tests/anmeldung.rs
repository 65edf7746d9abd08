//! Integrationstests fuer Login, Bans, Waechter und Passwort-Reset
//! (MemoryDb + TestUhr)

use std::sync::Arc;

use chrono::Duration;

use campushub_auth::{
    AdminService, AuthError, AuthOptionen, AuthService, BanService, ProfilCache, ProfilService,
    ResetStore, TokenDienst, Waechter,
};
use campushub_core::{KontoId, TestUhr, Uhr};
use campushub_db::{KontoRepository, KontoUpdate, MemoryDb, NeuesKonto, ProfilRepository};

const SECRET: &[u8] = b"integrationstest-secret-fuer-campushub-tokens";

struct Umgebung {
    db: Arc<MemoryDb>,
    uhr: Arc<TestUhr>,
    auth: Arc<AuthService<MemoryDb>>,
    admin: Arc<AdminService<MemoryDb>>,
    bans: Arc<BanService<MemoryDb>>,
    waechter: Arc<Waechter<MemoryDb>>,
    tokens: Arc<TokenDienst>,
    cache: Arc<ProfilCache>,
}

fn umgebung() -> Umgebung {
    let uhr = Arc::new(TestUhr::ab_jetzt());
    let db = Arc::new(MemoryDb::mit_uhr(uhr.clone()));
    let tokens = Arc::new(TokenDienst::neu(SECRET, Duration::hours(24), uhr.clone()).unwrap());
    let bans = BanService::neu(db.clone(), uhr.clone());
    let reset = ResetStore::neu(Duration::hours(1), uhr.clone());
    let cache = Arc::new(ProfilCache::neu());
    let profile = ProfilService::neu(db.clone(), cache.clone());

    Umgebung {
        auth: AuthService::neu(
            db.clone(),
            tokens.clone(),
            bans.clone(),
            reset,
            uhr.clone(),
            AuthOptionen::default(),
        ),
        admin: AdminService::neu(db.clone(), bans.clone(), profile, 6),
        waechter: Waechter::neu(tokens.clone(), db.clone()),
        db,
        uhr,
        bans,
        tokens,
        cache,
    }
}

const ADMIN: KontoId = KontoId(1_000);

#[tokio::test]
async fn login_rundlauf_liefert_verifizierbares_token() {
    let u = umgebung();
    let konto = u
        .auth
        .registrieren("  Alice@X.edu ", "Alice", "secret1")
        .await
        .unwrap();
    assert_eq!(konto.email, "alice@x.edu");
    assert!(konto.password_hash.starts_with("$argon2id$"));

    let anmeldung = u.auth.anmelden("alice@x.edu", "secret1").await.unwrap();
    let claims = u.tokens.pruefen(&anmeldung.token).unwrap();
    assert_eq!(claims.konto_id(), konto.id);
    assert_eq!(anmeldung.konto.id, konto.id);

    let gespeichert = u.db.get_by_id(konto.id).await.unwrap().unwrap();
    assert_eq!(gespeichert.last_login, Some(u.uhr.jetzt()));
}

#[tokio::test]
async fn falsches_passwort_und_unbekannte_email() {
    let u = umgebung();
    u.auth.registrieren("alice@x.edu", "Alice", "secret1").await.unwrap();

    assert!(matches!(
        u.auth.anmelden("alice@x.edu", "falsch!").await,
        Err(AuthError::UngueltigeAnmeldedaten)
    ));
    assert!(matches!(
        u.auth.anmelden("bob@x.edu", "secret1").await,
        Err(AuthError::UngueltigeAnmeldedaten)
    ));
    assert!(matches!(
        u.auth.anmelden("", "secret1").await,
        Err(AuthError::Validierung(_))
    ));
}

#[tokio::test]
async fn registrierung_validiert() {
    let u = umgebung();
    assert!(matches!(
        u.auth.registrieren("a@x.edu", "A", "12345").await,
        Err(AuthError::PasswortZuKurz(6))
    ));
    assert!(matches!(
        u.auth.registrieren("a@x.edu", " ", "123456").await,
        Err(AuthError::Validierung(_))
    ));
    u.auth.registrieren("a@x.edu", "A", "123456").await.unwrap();
    assert!(matches!(
        u.auth.registrieren("A@x.edu", "A2", "123456").await,
        Err(AuthError::EmailVergeben(_))
    ));
}

#[tokio::test]
async fn klartext_altbestand_wird_migriert() {
    let u = umgebung();
    let konto = u
        .db
        .create(NeuesKonto {
            email: "legacy@x.edu",
            password_hash: "secret1",
            is_admin: false,
        })
        .await
        .unwrap();

    u.auth.anmelden("legacy@x.edu", "secret1").await.unwrap();
    let gespeichert = u.db.get_by_id(konto.id).await.unwrap().unwrap();
    assert!(gespeichert.password_hash.starts_with("$argon2id$"));

    u.auth.anmelden("legacy@x.edu", "secret1").await.unwrap();
    assert!(matches!(
        u.auth.anmelden("legacy@x.edu", "anders").await,
        Err(AuthError::UngueltigeAnmeldedaten)
    ));
}

#[tokio::test]
async fn fehlgeschlagene_migration_blockiert_login_nicht() {
    let u = umgebung();
    let konto = u
        .db
        .create(NeuesKonto {
            email: "legacy@x.edu",
            password_hash: "secret1",
            is_admin: false,
        })
        .await
        .unwrap();

    u.db.schreibfehler_simulieren(true);
    u.auth.anmelden("legacy@x.edu", "secret1").await.unwrap();
    let gespeichert = u.db.get_by_id(konto.id).await.unwrap().unwrap();
    assert_eq!(gespeichert.password_hash, "secret1");

    // Naechster Login holt die Migration nach
    u.db.schreibfehler_simulieren(false);
    u.auth.anmelden("legacy@x.edu", "secret1").await.unwrap();
    let gespeichert = u.db.get_by_id(konto.id).await.unwrap().unwrap();
    assert!(gespeichert.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn deaktiviertes_konto() {
    let u = umgebung();
    let konto = u.auth.registrieren("a@x.edu", "A", "secret1").await.unwrap();
    u.db.update(
        konto.id,
        KontoUpdate {
            is_admin: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        u.auth.anmelden("a@x.edu", "secret1").await,
        Err(AuthError::BenutzerGesperrt)
    ));
}

#[tokio::test]
async fn alice_szenario() {
    let u = umgebung();
    let alice = u
        .auth
        .registrieren("alice@x.edu", "Alice", "secret1")
        .await
        .unwrap();

    let t = u.auth.anmelden("alice@x.edu", "secret1").await.unwrap().token;
    assert!(!t.is_empty());

    u.bans.bannen(ADMIN, alice.id, Some("spam"), None).await.unwrap();
    match u.auth.anmelden("alice@x.edu", "secret1").await {
        Err(AuthError::BenutzerGebannt { grund, restdauer }) => {
            assert_eq!(grund, "spam");
            assert!(restdauer.is_none());
        }
        anderes => panic!("Ban erwartet, erhalten: {anderes:?}"),
    }

    u.bans.entbannen(alice.id).await.unwrap();
    u.auth.anmelden("alice@x.edu", "secret1").await.unwrap();
}

#[tokio::test]
async fn restdauer_sinkt_streng_monoton() {
    let u = umgebung();
    let konto = u.auth.registrieren("a@x.edu", "A", "secret1").await.unwrap();
    let bis = u.uhr.jetzt() + Duration::days(2);
    u.bans.bannen(ADMIN, konto.id, Some("flood"), Some(bis)).await.unwrap();

    let mut vorher = i64::MAX;
    for _ in 0..5 {
        match u.auth.anmelden("a@x.edu", "secret1").await {
            Err(AuthError::BenutzerGebannt {
                restdauer: Some(r), ..
            }) => {
                assert!(r.sekunden < vorher);
                vorher = r.sekunden;
            }
            anderes => panic!("Ban erwartet, erhalten: {anderes:?}"),
        }
        u.uhr.vorstellen(Duration::hours(7));
    }

    // Ablauf erreicht: Ban wird aufgehoben und Login ist erlaubt
    u.uhr.setzen(bis);
    u.auth.anmelden("a@x.edu", "secret1").await.unwrap();
    let gespeichert = u.db.get_by_id(konto.id).await.unwrap().unwrap();
    assert!(!gespeichert.is_banned);
}

#[tokio::test]
async fn abgelaufener_ban_verschwindet_in_kontoliste() {
    let u = umgebung();
    let konto = u.auth.registrieren("a@x.edu", "A", "secret1").await.unwrap();
    let bis = u.uhr.jetzt() + Duration::minutes(30);
    u.bans.bannen(ADMIN, konto.id, Some("flood"), Some(bis)).await.unwrap();

    let liste = u.admin.konten_listen().await.unwrap();
    assert!(liste[0].is_banned);
    assert_eq!(liste[0].full_name.as_deref(), Some("A"));

    u.uhr.vorstellen(Duration::minutes(30));
    let liste = u.admin.konten_listen().await.unwrap();
    assert!(!liste[0].is_banned);
    assert!(liste[0].ban_reason.is_none());

    let liste = u.admin.konten_listen().await.unwrap();
    assert!(!liste[0].is_banned);
}

#[tokio::test]
async fn waechter_nach_herabstufung() {
    let u = umgebung();
    let konto = u
        .admin
        .konto_erstellen("chef@x.edu", "", "secret1", true)
        .await
        .unwrap();
    let token = u.auth.anmelden("chef@x.edu", "secret1").await.unwrap().token;
    let header = format!("Bearer {token}");

    assert_eq!(u.waechter.admin_erforderlich(Some(&header)).await.unwrap(), konto.id);

    u.admin
        .konto_aktualisieren(
            konto.id,
            campushub_auth::KontoAenderung {
                konto: KontoUpdate {
                    is_admin: Some(false),
                    is_active: None,
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        u.waechter.admin_erforderlich(Some(&header)).await,
        Err(AuthError::KeineBerechtigung)
    ));
}

#[tokio::test]
async fn gebanntes_konto_behaelt_gueltiges_token() {
    let u = umgebung();
    let konto = u.auth.registrieren("a@x.edu", "A", "secret1").await.unwrap();
    let token = u.auth.anmelden("a@x.edu", "secret1").await.unwrap().token;
    u.bans.bannen(ADMIN, konto.id, None, None).await.unwrap();

    // Bans werden nur beim Login geprueft
    let header = format!("Bearer {token}");
    assert_eq!(u.waechter.auth_erforderlich(Some(&header)).unwrap(), konto.id);
}

#[tokio::test]
async fn passwort_reset_ablauf() {
    let u = umgebung();
    u.auth.registrieren("alice@x.edu", "Alice", "secret1").await.unwrap();

    let link = u.auth.passwort_reset_anfordern("Alice@x.edu").await.unwrap();
    let token = link
        .strip_prefix("http://localhost:5173/sifre-sifirla?token=")
        .unwrap()
        .to_string();

    // Zu kurzes Passwort verbraucht das Token nicht
    assert!(matches!(
        u.auth.passwort_zuruecksetzen(&token, "kurz").await,
        Err(AuthError::PasswortZuKurz(6))
    ));

    u.auth.passwort_zuruecksetzen(&token, "neues-passwort").await.unwrap();
    assert!(matches!(
        u.auth.passwort_zuruecksetzen(&token, "noch-eins").await,
        Err(AuthError::ResetTokenUngueltig)
    ));

    assert!(u.auth.anmelden("alice@x.edu", "secret1").await.is_err());
    u.auth.anmelden("alice@x.edu", "neues-passwort").await.unwrap();
}

#[tokio::test]
async fn schreibfehler_beim_reset_verbraucht_token_nicht() {
    let u = umgebung();
    u.auth.registrieren("bob@x.edu", "Bob", "secret1").await.unwrap();
    let link = u.auth.passwort_reset_anfordern("bob@x.edu").await.unwrap();
    let token = link.rsplit('=').next().unwrap().to_string();

    u.db.schreibfehler_simulieren(true);
    assert!(matches!(
        u.auth.passwort_zuruecksetzen(&token, "neuespasswort").await,
        Err(AuthError::Datenbank(_))
    ));
    assert!(u.auth.anmelden("bob@x.edu", "neuespasswort").await.is_err());

    // Derselbe Link funktioniert nach dem Ausfall
    u.db.schreibfehler_simulieren(false);
    u.auth.passwort_zuruecksetzen(&token, "neuespasswort").await.unwrap();
    u.auth.anmelden("bob@x.edu", "neuespasswort").await.unwrap();
    assert!(matches!(
        u.auth.passwort_zuruecksetzen(&token, "drittespasswort").await,
        Err(AuthError::ResetTokenUngueltig)
    ));
}

#[tokio::test]
async fn passwort_reset_fehlerfaelle() {
    let u = umgebung();
    u.auth.registrieren("alice@x.edu", "Alice", "secret1").await.unwrap();

    assert!(matches!(
        u.auth.passwort_reset_anfordern("niemand@x.edu").await,
        Err(AuthError::NichtGefunden(_))
    ));

    let link = u.auth.passwort_reset_anfordern("alice@x.edu").await.unwrap();
    let token = link.rsplit('=').next().unwrap().to_string();
    u.uhr.vorstellen(Duration::hours(1));
    assert!(matches!(
        u.auth.passwort_zuruecksetzen(&token, "neues-passwort").await,
        Err(AuthError::ResetTokenUngueltig)
    ));
    // Ungueltiges Token hat Vorrang vor zu kurzem Passwort
    assert!(matches!(
        u.auth.passwort_zuruecksetzen("gibt-es-nicht", "x").await,
        Err(AuthError::ResetTokenUngueltig)
    ));
}

#[tokio::test]
async fn admin_loeschen_und_profil() {
    let u = umgebung();
    let konto = u.auth.registrieren("a@x.edu", "A", "secret1").await.unwrap();

    let details = u.admin.konto_laden(konto.id).await.unwrap();
    assert_eq!(details.profil.full_name.as_deref(), Some("A"));

    assert!(matches!(
        u.admin.konto_loeschen(konto.id, konto.id).await,
        Err(AuthError::Validierung(_))
    ));
    assert_eq!(u.cache.len(), 1);
    u.admin.konto_loeschen(ADMIN, konto.id).await.unwrap();
    assert!(u.cache.is_empty());
    assert!(matches!(
        u.admin.konto_laden(konto.id).await,
        Err(AuthError::NichtGefunden(_))
    ));
    assert!(matches!(
        u.admin.konto_loeschen(ADMIN, konto.id).await,
        Err(AuthError::NichtGefunden(_))
    ));
    assert!(matches!(
        u.admin.konto_loeschen(ADMIN, KontoId(424_242)).await,
        Err(AuthError::NichtGefunden(_))
    ));
    assert!(u.cache.is_empty());
    assert!(u.db.load_profile_view(konto.id).await.unwrap().is_none());
}
