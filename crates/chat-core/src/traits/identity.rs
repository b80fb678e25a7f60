use async_trait::async_trait;

use crate::entities::UserIdentity;
use crate::error::AuthError;

/// Turns a presented credential token into a user identity
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError>;
}
