//! API handlers for the LAcra auth server

pub mod auth;
pub mod health;
pub mod identity;
pub mod platform;

pub use auth::{issue_challenge, prepare_message, verify_signature};
pub use health::health_check;
pub use identity::{login_callback, login_redirect};
pub use platform::{get_profile, get_stats, list_events, register, update_profile};
