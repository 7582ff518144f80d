//! Shared state: every service behind cheap `Clone`

use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{AccessGuard, JwtService};
use crate::catalog::{CatalogService, ReviewService};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::orders::{InventoryLedger, OrderService};
use crate::users::UserService;
use crate::utils::AppResult;

/// Storefront state - holds the database handle and all services.
///
/// | Field | Role |
/// |-------|------|
/// | config | immutable configuration |
/// | db | embedded SurrealDB handle |
/// | guard | credential resolution + permission checks |
/// | catalog | product CRUD and listing |
/// | reviews | review append + aggregate recompute |
/// | inventory | standalone stock reservation |
/// | orders | checkout and order state machine |
/// | users | account lifecycle |
///
/// No request state lives in the process; every operation re-reads from
/// the store.
#[derive(Clone)]
pub struct StoreState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub guard: AccessGuard,
    pub catalog: CatalogService,
    pub reviews: ReviewService,
    pub inventory: InventoryLedger,
    pub orders: OrderService,
    pub users: UserService,
}

impl StoreState {
    /// Initialize against the on-disk database under the work dir
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(config.database_dir()).map_err(|e| {
            crate::utils::AppError::internal(format!("Failed to create work directory: {e}"))
        })?;
        let db_path = config.database_dir().join("store.db");
        let db_service = DbService::open(&db_path.to_string_lossy()).await?;
        Ok(Self::from_db(config.clone(), db_service.db))
    }

    /// Initialize against a fresh in-memory database (tests)
    pub async fn initialize_in_memory(config: &Config) -> AppResult<Self> {
        let db_service = DbService::memory().await?;
        Ok(Self::from_db(config.clone(), db_service.db))
    }

    fn from_db(config: Config, db: Surreal<Db>) -> Self {
        let timeout = config.db_timeout();
        let products = ProductRepository::new(db.clone(), timeout);
        let orders_repo = OrderRepository::new(db.clone(), timeout);
        let users_repo = UserRepository::new(db.clone(), timeout);

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let guard = AccessGuard::new(jwt_service.clone());

        Self {
            catalog: CatalogService::new(products.clone()),
            reviews: ReviewService::new(products.clone()),
            inventory: InventoryLedger::new(products.clone()),
            orders: OrderService::new(products, orders_repo, config.pricing.clone()),
            users: UserService::new(users_repo, jwt_service.clone()),
            guard,
            jwt_service,
            db,
            config,
        }
    }
}
