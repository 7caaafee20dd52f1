use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sifter::engine::EsClient;
use sifter::visibility::{HttpProfileProbe, VisibilityResolver};
use sifter::Config;

use crate::handlers::{ping, search, AppState};

/// Assembles the router over an already-constructed state. Exposed so tests
/// can wire in stub capabilities.
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/ping", get(ping))
        .route("/api/search", get(search))
        .with_state(state);

    if enable_cors {
        router.layer(
            CorsLayer::very_permissive().max_age(std::time::Duration::from_secs(86400)),
        )
    } else {
        router
    }
}

pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let es = Arc::new(EsClient::new(&config.es_url)?);

    let visibility = if config.disable_user_check {
        tracing::warn!("author visibility check disabled");
        None
    } else {
        let probe = Arc::new(HttpProfileProbe::new(&config.profile_url_template)?);
        Some(Arc::new(VisibilityResolver::new(probe)))
    };

    let state = Arc::new(AppState {
        engine: es.clone(),
        nodes: es,
        visibility,
    });

    let app = build_router(state, config.enable_cors);

    tracing::info!(
        bind_addr = %config.bind_addr,
        es_url = %config.es_url,
        "starting sifter server"
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
