//! Inventory Ledger
//!
//! Stock reservation: validating and decrementing `count_in_stock` is one
//! atomic step, never check-then-decrement across calls. Checkout reserves
//! all line items inside the order-create transaction; this ledger exposes
//! the same compare-and-decrement for a single product.

use crate::db::repository::ProductRepository;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct InventoryLedger {
    products: ProductRepository,
}

impl InventoryLedger {
    pub fn new(products: ProductRepository) -> Self {
        Self { products }
    }

    /// Reserve `qty` units of a product.
    ///
    /// Fails with `InsufficientStock` when the remaining stock is short,
    /// `NotFound` when the product does not exist, `Validation` for a
    /// non-positive quantity. On failure the stock is untouched.
    pub async fn reserve(&self, product_id: &str, qty: i64) -> AppResult<()> {
        self.products.reserve(product_id, qty).await?;
        Ok(())
    }
}
