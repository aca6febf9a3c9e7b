//! Domain error type shared by services, stores, and the HTTP adapter.

use thiserror::Error;

/// Every failure a marketplace operation can report.
///
/// The HTTP status each variant maps to lives in
/// `transport::http::error`, keeping the domain free of transport types.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already taken")]
    UsernameTaken,

    /// Login against a username that was never registered.
    #[error("User not found")]
    UnknownUser,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer token.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Product not found")]
    ProductNotFound,

    /// Profile update against a username with no account.
    #[error("User not found")]
    UserNotFound,

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MarketError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures caused by the server rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Internal(_))
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
