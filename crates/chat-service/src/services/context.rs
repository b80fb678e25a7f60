//! Service context - dependency container for services

use std::sync::Arc;

use chat_common::auth::JwtService;
use chat_common::HistoryConfig;
use chat_core::traits::{MessageStore, UserDirectory};

use super::error::{ServiceError, ServiceResult};

/// Dependencies shared by every service
#[derive(Clone)]
pub struct ServiceContext {
    users: Arc<dyn UserDirectory>,
    messages: Arc<dyn MessageStore>,
    jwt_service: Arc<JwtService>,
    history: HistoryConfig,
}

impl ServiceContext {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        messages: Arc<dyn MessageStore>,
        jwt_service: Arc<JwtService>,
        history: HistoryConfig,
    ) -> Self {
        Self {
            users,
            messages,
            jwt_service,
            history,
        }
    }

    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::default()
    }

    pub fn users(&self) -> &dyn UserDirectory {
        self.users.as_ref()
    }

    /// Shared handle to the directory, for collaborators that outlive a request
    pub fn users_arc(&self) -> Arc<dyn UserDirectory> {
        Arc::clone(&self.users)
    }

    pub fn messages(&self) -> &dyn MessageStore {
        self.messages.as_ref()
    }

    pub fn messages_arc(&self) -> Arc<dyn MessageStore> {
        Arc::clone(&self.messages)
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn jwt_service_arc(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }

    pub fn history(&self) -> &HistoryConfig {
        &self.history
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("jwt_service", &self.jwt_service)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    users: Option<Arc<dyn UserDirectory>>,
    messages: Option<Arc<dyn MessageStore>>,
    jwt_service: Option<Arc<JwtService>>,
    history: Option<HistoryConfig>,
}

impl ServiceContextBuilder {
    pub fn users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn messages(mut self, messages: Arc<dyn MessageStore>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn history(mut self, history: HistoryConfig) -> Self {
        self.history = Some(history);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let required = |name: &str| ServiceError::validation(format!("{name} is required"));

        Ok(ServiceContext::new(
            self.users.ok_or_else(|| required("users"))?,
            self.messages.ok_or_else(|| required("messages"))?,
            self.jwt_service.ok_or_else(|| required("jwt_service"))?,
            self.history.unwrap_or_default(),
        ))
    }
}
