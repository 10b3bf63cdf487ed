//! LAcra authentication server
//!
//! HTTP server for the LAcra live-event platform's account surface: wallet
//! challenge-response login, identity provider glue, and pass-through reads
//! of platform data from the hosted store.

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::Key;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::CorsLayer;

use lacra_server::auth::AuthService;
use lacra_server::config::Config;
use lacra_server::handlers::health_check;
use lacra_server::identity::IdentityClient;
use lacra_server::middleware::{self, RateLimiter};
use lacra_server::routes;
use lacra_server::state::AppState;
use lacra_server::store::StoreClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = %config.environment.as_str(),
        domain = %config.site_domain,
        store_key = %config.store_api_key_masked(),
        "Starting LAcra auth server"
    );

    // External-resource handles are built once here and fail loudly on bad
    // configuration; handlers only ever see them through AppState
    let store = StoreClient::new(&config)?;
    let identity = IdentityClient::new(&config)?;
    let auth = AuthService::new(&config);
    let cookie_key = Key::derive_from(config.cookie_secret.as_bytes());

    let state = AppState::new(auth, store, identity, cookie_key);

    let rate_limiter = RateLimiter::new(config.rate_limit_rps);

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(routes::auth_routes())
        .merge(routes::platform_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_layer(limiter)(req, next)
        }))
        .layer(configure_cors(&config));

    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn root() -> &'static str {
    "LAcra Auth API"
}

fn configure_cors(config: &Config) -> CorsLayer {
    let Some(allowed) = config.cors_allowed_origins.as_deref() else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = allowed
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    // Cookies ride along, so origins and headers must be explicit;
    // wildcards cannot be combined with credentials
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
