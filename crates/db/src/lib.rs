//! campushub-db – Credential-Store
//!
//! Dieses Crate stellt das Repository-Pattern bereit, das SQLite (Standard)
//! und einen fluechtigen In-Memory-Speicher hinter einer einheitlichen
//! Schnittstelle abstrahiert.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use memory::MemoryDb;
pub use models::{
    FotoArt, KontoRecord, KontoUpdate, NeuesKonto, ProfilAnsicht, ProfilRecord, ProfilUpdate,
};
pub use repository::{
    DatabaseBackend, DatabaseConfig, Datenbank, DbResult, KontoRepository, ProfilRepository,
};
pub use sqlite::SqliteDb;
