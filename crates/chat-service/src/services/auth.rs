//! Authentication service
//!
//! Sign-up and login. Neither touches presence; a user only becomes online
//! once a real-time connection registers.

use chat_common::auth::{hash_password, verify_password};
use chat_core::entities::User;
use chat_core::value_objects::UserId;
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, LoginRequest, SignupRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an account and issue a token for it
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<AuthResponse> {
        let username = User::normalize_username(&request.username);
        if username.is_empty() || request.password.is_empty() {
            return Err(ServiceError::validation("Missing fields"));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(UserId::new(), &username, request.display_name);

        // The store enforces uniqueness; a racing signup surfaces as UsernameTaken.
        self.ctx.users().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User signed up");
        self.issue(&user)
    }

    /// Check credentials and issue a token
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let Some(credentials) = self.ctx.users().find_credentials(&request.username).await? else {
            warn!("Login failed: unknown username");
            return Err(ServiceError::invalid_credentials());
        };

        if !verify_password(&request.password, &credentials.password_hash)? {
            warn!(user_id = %credentials.user.id, "Login failed: wrong password");
            return Err(ServiceError::invalid_credentials());
        }

        info!(user_id = %credentials.user.id, "User logged in");
        self.issue(&credentials.user)
    }

    fn issue(&self, user: &User) -> ServiceResult<AuthResponse> {
        let token = self.ctx.jwt_service().issue(user.id)?;
        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }
}
