//! # chat-service
//!
//! Application layer containing the auth and history use cases, the token-based
//! identity verifier, and the DTOs shared by the REST API and the gateway.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, HistoryService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, TokenVerifier,
};
