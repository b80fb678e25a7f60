//! Data transfer objects shared by the REST API and the gateway
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing outputs (camelCase on the wire)
//! - Mappers from domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{HistoryParams, LoginRequest, SignupRequest};
pub use responses::{AuthResponse, HealthResponse, MessageResponse, SenderResponse, UserResponse};
