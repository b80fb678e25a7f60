//! Gateway state
//!
//! Application state for the gateway server.

use crate::hub::Hub;
use chat_common::GatewayConfig;
use chat_core::{AuthError, IdentityVerifier, UserIdentity};
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Connection registry, rooms, presence and routing
    hub: Arc<Hub>,
    /// Verifies handshake tokens
    verifier: Arc<dyn IdentityVerifier>,
    /// Gateway configuration
    config: Arc<GatewayConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(hub: Arc<Hub>, verifier: Arc<dyn IdentityVerifier>, config: GatewayConfig) -> Self {
        Self {
            hub,
            verifier,
            config: Arc::new(config),
        }
    }

    /// Get the hub
    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Get the shared hub handle
    pub fn hub_arc(&self) -> Arc<Hub> {
        self.hub.clone()
    }

    /// Verify a handshake token
    pub async fn authenticate(&self, token: &str) -> Result<UserIdentity, AuthError> {
        self.verifier.verify(token).await
    }

    /// Get the gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("hub", &self.hub)
            .field("config", &self.config)
            .finish()
    }
}
