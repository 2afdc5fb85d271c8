mod handlers;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Start the API server
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    // The browser frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // OAuth proxy
        .route("/api/github/token", post(handlers::exchange_token))
        // Diagram generation
        .route("/api/generate-uml", post(handlers::generate_uml))
        .route("/api/ai-generate-uml", post(handlers::ai_generate_uml))
        .route(
            "/api/ai-generate-uml-focused",
            post(handlers::ai_generate_uml_focused),
        )
        // Health check
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
