//! Store Server - e-commerce storefront core
//!
//! # Architecture
//!
//! The crate is the storefront's domain core: catalog with embedded
//! reviews, inventory-consistent checkout, order state machine and account
//! management over an embedded SurrealDB document store. HTTP routing,
//! image hosting and process bootstrap are external collaborators driving
//! the service methods on [`StoreState`].
//!
//! # Module structure
//!
//! ```text
//! store-server/src/
//! ├── core/          # configuration, shared state
//! ├── auth/          # JWT tokens, access guard
//! ├── db/            # embedded SurrealDB, models, repositories
//! ├── catalog/       # product store + review aggregation
//! ├── orders/        # checkout, inventory ledger, money math
//! ├── users/         # account lifecycle
//! └── utils/         # errors, logging, validation
//! ```
//!
//! The two invariants everything else bends around:
//! - stock is reserved with an atomic compare-and-decrement inside the
//!   order-create transaction, so it can never go negative;
//! - a product's `rating`/`num_reviews` are recomputed from the full
//!   review list in the same transaction that appends a review.

pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod users;
pub mod utils;

// Re-export public types
pub use auth::{AccessGuard, Identity, JwtService};
pub use catalog::{CatalogService, ReviewService};
pub use core::{Config, StoreState};
pub use orders::{InventoryLedger, OrderService};
pub use users::UserService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
