//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::auth::AuthService;
use crate::identity::IdentityClient;
use crate::store::StoreClient;

/// Shared application state.
///
/// Every external-resource handle lives here and is constructed once at
/// process start; handlers receive it through `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub store: Arc<StoreClient>,
    pub identity: Arc<IdentityClient>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(
        auth: AuthService,
        store: StoreClient,
        identity: IdentityClient,
        cookie_key: Key,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            store: Arc::new(store),
            identity: Arc::new(identity),
            cookie_key,
        }
    }
}

// Lets SignedCookieJar pull its signing key out of the shared state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
