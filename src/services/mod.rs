pub mod account_service;
pub mod expense_service;
pub mod id_service;
pub mod jwt_service;
pub mod loan_service;
pub mod member_service;
pub mod repayment_service;
pub mod revenue_service;
pub mod staff_service;
pub mod wallet_service;

use thiserror::Error;

/// Typed failure categories the API layer maps to HTTP statuses. Services
/// return `anyhow::Result`; wrapping one of these variants lets handlers
/// downcast and pick the right status instead of guessing from the message.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Unauthorized(String),
}

impl CoreError {
    pub fn not_found(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(CoreError::NotFound(msg.into()))
    }

    pub fn conflict(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(CoreError::Conflict(msg.into()))
    }

    pub fn invalid(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(CoreError::Invalid(msg.into()))
    }

    pub fn unauthorized(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(CoreError::Unauthorized(msg.into()))
    }
}
