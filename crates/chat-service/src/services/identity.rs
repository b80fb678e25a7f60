//! Token-based identity verification for the real-time gateway

use std::sync::Arc;

use async_trait::async_trait;
use chat_common::JwtService;
use chat_core::entities::UserIdentity;
use chat_core::error::AuthError;
use chat_core::traits::{IdentityVerifier, UserDirectory};
use tracing::{debug, warn};

/// Validates a bearer token and loads the user's display identity once
#[derive(Clone)]
pub struct TokenVerifier {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserDirectory>,
}

impl TokenVerifier {
    pub fn new(jwt: Arc<JwtService>, users: Arc<dyn UserDirectory>) -> Self {
        Self { jwt, users }
    }
}

#[async_trait]
impl IdentityVerifier for TokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let user_id = self.jwt.validate(token)?.user_id()?;

        let user = self.users.find_by_id(user_id).await.map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Directory lookup failed during auth");
            AuthError::Unavailable(e.to_string())
        })?;

        match user {
            Some(user) => Ok(user.identity()),
            None => {
                debug!(user_id = %user_id, "Token names an unknown user");
                Err(AuthError::UnknownUser)
            }
        }
    }
}
