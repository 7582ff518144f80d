//! Database Module
//!
//! Embedded SurrealDB: RocksDB engine for the on-disk store, in-memory
//! engine for tests. Schema definitions run at open time.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// Tables and indexes. Reviews are embedded in the product document, so
/// the per-(product, user) duplicate check runs inside the product
/// transaction; no separate review table exists.
const SCHEMA: &str = "
DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX IF NOT EXISTS order_owner ON TABLE order COLUMNS user;
";

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database at `path`
    pub async fn open(path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        let service = Self::init(db).await?;
        tracing::info!(path, "Database opened (embedded RocksDB)");
        Ok(service)
    }

    /// Open an in-memory database (tests)
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns("store")
            .use_db("store")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;

        Ok(Self { db })
    }
}
