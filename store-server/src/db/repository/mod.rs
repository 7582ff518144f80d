//! Repository Module
//!
//! CRUD and transactional operations against SurrealDB tables. All
//! multi-step invariants (stock reservation, review aggregation) run as a
//! single `BEGIN … COMMIT` query so readers never observe partial state;
//! `THROW` sentinels inside those transactions are parsed back into typed
//! errors here.

pub mod order;
pub mod product;
pub mod user;

pub use order::{OrderRepository, Reservation};
pub use product::ProductRepository;
pub use user::UserRepository;

use crate::utils::AppError;
use std::future::Future;
use std::time::Duration;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

// Sentinels thrown inside transactional queries
pub(crate) const THROW_PRODUCT_NOT_FOUND: &str = "PRODUCT_NOT_FOUND";
pub(crate) const THROW_REVIEW_EXISTS: &str = "REVIEW_EXISTS";
pub(crate) const THROW_OUT_OF_STOCK: &str = "OUT_OF_STOCK";

/// Attempts for an optimistic transaction before giving up. A retried
/// transaction re-reads, so the loser of a stock race still gets the
/// real answer (OUT_OF_STOCK), not a commit conflict.
pub(crate) const MAX_TX_RETRIES: usize = 5;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// Optimistic transaction conflict; safe to retry
    #[error("Transaction conflict: {0}")]
    TxConflict(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        map_db_error(&err.to_string())
    }
}

/// Map a raw database error message, honoring transaction sentinels and
/// unique-index violations.
pub(crate) fn map_db_error(msg: &str) -> RepoError {
    if msg.contains(THROW_PRODUCT_NOT_FOUND) {
        RepoError::NotFound("Product not found".to_string())
    } else if msg.contains(THROW_REVIEW_EXISTS) {
        RepoError::Duplicate("Product already reviewed".to_string())
    } else if msg.contains(THROW_OUT_OF_STOCK) {
        RepoError::InsufficientStock("Not enough stock".to_string())
    } else if msg.contains("user_email") {
        RepoError::Duplicate("Email already registered".to_string())
    } else if msg.contains("read or write conflict")
        || msg.contains("can be retried")
        || msg.contains("Resource busy")
    {
        RepoError::TxConflict(msg.to_string())
    } else {
        RepoError::Database(msg.to_string())
    }
}

/// Collect statement-level errors from a response, mapping sentinels.
/// Returns `None` when every statement succeeded.
pub(crate) fn take_statement_errors(response: &mut surrealdb::Response) -> Option<RepoError> {
    let errors = response.take_errors();
    if errors.is_empty() {
        return None;
    }
    let mut joined = String::new();
    for err in errors.values() {
        joined.push_str(&err.to_string());
        joined.push('\n');
    }
    Some(map_db_error(&joined))
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::InsufficientStock(msg) => AppError::InsufficientStock(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Timeout(op) => AppError::database(format!("{op} timed out")),
            RepoError::TxConflict(msg) => AppError::database(msg),
        }
    }
}

/// Parse a record id, accepting both "table:key" and a bare key.
pub(crate) fn record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if id.contains(':') {
        let rid: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        if rid.table() != table {
            return Err(RepoError::Validation(format!(
                "Invalid {} ID: {}",
                table, id
            )));
        }
        Ok(rid)
    } else if id.is_empty() {
        Err(RepoError::Validation("Invalid ID: empty".to_string()))
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Base repository with database handle and per-call timeout
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
    timeout: Duration,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Run a repository future under the configured timeout. A timed-out
    /// call surfaces as [`RepoError::Timeout`], never as a missing entity.
    pub async fn guard<T, F>(&self, op: &str, fut: F) -> RepoResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RepoError::Timeout(op.to_string())),
        }
    }
}
