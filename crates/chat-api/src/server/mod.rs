//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chat_common::{AppConfig, AppError, JwtService};
use chat_core::{MessageStore, UserDirectory};
use chat_db::{create_pool, run_migrations, PgMessageStore, PgUserDirectory};
use chat_service::ServiceContext;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the application without rate limiting or CORS
pub fn create_app(state: AppState) -> Router {
    apply_middleware(create_router())
        .merge(health_routes())
        .with_state(state)
}

/// Build the application with the full middleware stack from `state`'s
/// configuration. Health checks bypass the rate limiter.
///
/// # Errors
/// Returns an error if the rate limit configuration is unusable.
pub fn create_app_with_config(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let router = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(router.merge(health_routes()).with_state(state))
}

/// Assemble `AppState` over the given stores
///
/// # Errors
/// Returns an error if the service context cannot be built.
pub fn build_app_state(
    config: AppConfig,
    jwt_service: Arc<JwtService>,
    users: Arc<dyn UserDirectory>,
    messages: Arc<dyn MessageStore>,
) -> Result<AppState, AppError> {
    let service_context = ServiceContext::builder()
        .users(users)
        .messages(messages)
        .jwt_service(jwt_service)
        .history(config.history)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Connect to PostgreSQL, apply migrations and create `AppState`
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = chat_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;

    let jwt_service = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.token_expiry));
    let users = Arc::new(PgUserDirectory::new(pool.clone()));
    let messages = Arc::new(PgMessageStore::new(pool));

    build_app_state(config, jwt_service, users, messages)
}

/// Serve the API on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app_with_config(state)?;

    run_server(app, addr).await
}
