//! campushub-api – REST-Schnittstelle
//!
//! Stellt die Auth-, Profil- und Admin-Operationen als JSON-API bereit.
//! Bearer-Token werden ueber Extraktoren geprueft, die den Waechter des
//! Auth-Crates aufrufen.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod ueberwachung;
pub mod zustellung;

pub use error::{ApiError, ApiResult};
pub use extract::{AdminKonto, AuthKonto};
pub use routes::api_router;
pub use server::{app, ApiServer, ApiServerKonfig};
pub use state::ApiState;
pub use ueberwachung::{db_pruefen, db_ueberwachung_starten, STANDARD_PRUEFINTERVALL};
pub use zustellung::{LoggingZustellung, ResetZustellung, ZustellFehler};
