//! Wallet authentication for LAcra
//!
//! Challenge-response login with Ethereum wallets:
//! - Single-use, time-bounded challenge nonces
//! - Deterministic sign-in message construction
//! - EIP-191 signature recovery and verification

pub mod crypto;
pub mod message;
mod service;

pub use message::SignInMessage;
pub use service::{AuthError, AuthService, Challenge};
