//! HTTP server for synmd

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use synm_common::{StoreConfig, DEFAULT_PORT, FALLBACK_PORT};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::middleware::{body_size_limit, require_auth};
use crate::routes;
use crate::state::{create_shared_store, SharedStore, StoreState};

/// Build the router. `/api/auth/*` stays open; everything else goes
/// through the credential check. Any origin may call the API.
pub fn app(store: SharedStore) -> Router {
    let protected = Router::new()
        .merge(routes::player_routes())
        .merge(routes::action_routes())
        .merge(routes::settings_routes())
        .route_layer(middleware::from_fn_with_state(store.clone(), require_auth));

    Router::new()
        .merge(routes::auth_routes())
        .merge(protected)
        .with_state(store)
        .layer(middleware::from_fn(body_size_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the listen address. When the default port is taken, try the
/// fallback port once.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", addr))?;

    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if addr.port() == DEFAULT_PORT => {
            warn!("Port {} unavailable ({}), trying {}", DEFAULT_PORT, e, FALLBACK_PORT);
            let fallback = SocketAddr::new(addr.ip(), FALLBACK_PORT);
            TcpListener::bind(fallback)
                .await
                .with_context(|| format!("Failed to bind {} or {}", addr, fallback))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to bind {}", addr)),
    }
}

/// Run the HTTP server until ctrl-c
pub async fn run(config: StoreConfig) -> Result<()> {
    let state = StoreState::from_config(&config);
    if config.demo {
        info!("Demo mode: default key is \"demo\"");
    }
    if !state.auth.is_initialized() {
        info!("Store uninitialized; first /api/auth/init establishes the key");
    }
    let store = create_shared_store(state);

    let listener = bind(&config.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(store))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}
