//! LAcra authentication server library
//!
//! Wallet challenge-response login for the LAcra live-event platform, plus
//! thin clients for the hosted data store and identity provider.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
