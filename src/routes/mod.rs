//! Route definitions for the LAcra auth API

mod auth;
mod platform;

pub use auth::auth_routes;
pub use platform::platform_routes;
