//! campushub-core – Gemeinsame Typen und Zeitquelle
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! CampusHub-Crates gemeinsam genutzt werden: Identifikationstypen und
//! die injizierbare Uhr fuer alle zeitabhaengigen Entscheidungen.

pub mod clock;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use clock::{SystemUhr, TestUhr, Uhr};
pub use types::KontoId;
