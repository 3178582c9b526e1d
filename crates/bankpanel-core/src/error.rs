//! Error type shared across the banking panel crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BankPanelError>;

#[derive(Debug, Error)]
pub enum BankPanelError {
    /// Input rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Upstream identity service refused or failed the request.
    #[error("{0}")]
    Identity(String),

    /// Table store failure (query, insert, update, delete).
    #[error("{0}")]
    Store(String),

    /// Multi-step provisioning could not be completed.
    #[error("{0}")]
    Provision(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl BankPanelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn provision(msg: impl Into<String>) -> Self {
        Self::Provision(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
