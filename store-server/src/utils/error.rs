//! Unified error handling
//!
//! Application-level error type for every storefront operation:
//! - [`AppError`] - the error taxonomy returned to callers
//! - [`AppResult`] - result alias used across services
//!
//! # Error code scheme
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E2xxx | authorization | E2001 permission denied |
//! | E3xxx | authentication | E3003 token expired |
//! | E0xxx | business logic | E0003 not found |
//! | E9xxx | system | E9002 database error |
//!
//! Validation and authorization failures are always detected before any
//! mutation, so an error result implies no partial writes. Storage failures
//! keep their own variants and are never reported as [`AppError::NotFound`].

use tracing::error;

/// Application error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business logic errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Product already reviewed by this user")]
    DuplicateReview,

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    // ========== System errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code for clients and logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "E3001",
            AppError::InvalidToken => "E3002",
            AppError::TokenExpired => "E3003",
            AppError::Forbidden(_) => "E2001",
            AppError::Validation(_) => "E0002",
            AppError::NotFound(_) => "E0003",
            AppError::Conflict(_) => "E0004",
            AppError::DuplicateReview => "E0007",
            AppError::InsufficientStock(_) => "E0008",
            AppError::InvalidState(_) => "E0009",
            AppError::Database(_) => "E9002",
            AppError::Internal(_) => "E9001",
        }
    }

    /// True for system failures that should be logged, not shown verbatim
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

// ========== Helper constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::InsufficientStock(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!(target: "database", error = %msg, "Database error occurred");
        Self::Database(msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!(target: "internal", error = %msg, "Internal error occurred");
        Self::Internal(msg)
    }

    /// Unified login failure, prevents email enumeration
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized
    }
}

/// Result type for service operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::not_found("x").code(), "E0003");
        assert_eq!(AppError::DuplicateReview.code(), "E0007");
        assert_eq!(AppError::insufficient_stock("x").code(), "E0008");
        assert_eq!(AppError::invalid_state("x").code(), "E0009");
        assert_eq!(AppError::database("x").code(), "E9002");
    }

    #[test]
    fn test_internal_errors_flagged() {
        assert!(AppError::database("boom").is_internal());
        assert!(AppError::internal("boom").is_internal());
        assert!(!AppError::not_found("p").is_internal());
    }

    #[test]
    fn test_storage_failure_is_not_not_found() {
        // A broken store must never masquerade as a missing entity
        let err = AppError::database("connection reset");
        assert!(!matches!(err, AppError::NotFound(_)));
    }
}
