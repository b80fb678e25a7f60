//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::{gateway_handler, GatewayQuery};
pub use state::GatewayState;

use crate::hub::Hub;
use axum::{routing::get, Router};
use chat_common::{AppConfig, AppError, GatewayConfig, JwtService};
use chat_core::{MessageStore, UserDirectory};
use chat_service::TokenVerifier;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Assemble the gateway over the given stores.
///
/// Spawns the presence tasks, so it must run inside a Tokio runtime.
pub fn build_gateway_state(
    config: GatewayConfig,
    jwt_service: Arc<JwtService>,
    users: Arc<dyn UserDirectory>,
    messages: Arc<dyn MessageStore>,
) -> GatewayState {
    let hub = Hub::new(messages, users.clone(), config.default_rooms.clone());
    let verifier = Arc::new(TokenVerifier::new(jwt_service, users));
    GatewayState::new(hub, verifier, config)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = chat_db::DatabaseConfig::from(&config.database);
    let pool = chat_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    let jwt_service = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.token_expiry));
    let users = Arc::new(chat_db::PgUserDirectory::new(pool.clone()));
    let messages = Arc::new(chat_db::PgMessageStore::new(pool));

    Ok(build_gateway_state(
        config.gateway,
        jwt_service,
        users,
        messages,
    ))
}

/// Serve the gateway on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on ws://{}/gateway", addr);
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .gateway
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid gateway address: {e}")))?;

    // Create gateway state
    let state = create_gateway_state(config).await?;

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}
