// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use votes_ledger_repository::VotesRepository;

use self::handlers::VOTER_HEADER;
use self::state::AppState;
use crate::errors::ServiceError;

/// Create the Axum application router with all routes and middleware.
pub fn create_app<R: VotesRepository + 'static>(
    state: AppState<R>,
    allowed_origins: &[String],
) -> Result<Router, ServiceError> {
    Ok(Router::new()
        .route("/votes", post(handlers::cast_vote::<R>))
        .route("/votes/state", get(handlers::vote_state::<R>))
        .route("/votes/count", get(handlers::votes_count::<R>))
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// CORS layer for the configured front-end origins.
pub fn create_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, ServiceError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ServiceError::config(format!("invalid CORS origin: {origin}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(VOTER_HEADER)]))
}

/// Run the server on the specified address until ctrl-c.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServiceError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    info!("- Votes endpoint: http://{}/votes", addr);
    info!("- Health endpoint: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
