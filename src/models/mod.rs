//! Data models for the LAcra auth server

pub mod auth;
pub use auth::*;
