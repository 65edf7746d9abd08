//! REST-Handler, gruppiert nach Bereich

pub mod admin;
pub mod auth;
pub mod profil;
pub mod system;
