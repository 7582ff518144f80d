//! Order Repository
//!
//! Creation folds every line-item stock reservation and the order insert
//! into one serializable transaction: either all reservations hold and the
//! order exists, or nothing changed. Concurrent checkouts over the same
//! stock therefore cannot both succeed past `count_in_stock`.

use super::{
    BaseRepository, MAX_TX_RETRIES, RepoError, RepoResult, record_id, take_statement_errors,
};
use crate::db::models::{Order, PaymentResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ORDER_TABLE: &str = "order";

/// All-or-nothing checkout transaction. Each line item is checked and
/// decremented in place; any shortfall or missing product cancels the
/// whole transaction including the order insert.
const PLACE_ORDER_QUERY: &str = r#"
BEGIN TRANSACTION;
FOR $item IN $items {
    LET $target = $item.product;
    LET $prod = (SELECT * FROM $target)[0];
    IF $prod == NONE { THROW "PRODUCT_NOT_FOUND" };
    IF $prod.count_in_stock < $item.qty { THROW "OUT_OF_STOCK" };
    UPDATE $target SET count_in_stock -= $item.qty;
};
CREATE $order_id CONTENT $order;
COMMIT TRANSACTION;
"#;

/// One stock reservation inside the checkout transaction.
/// `product` binds as a native record id so the loop can update it directly.
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub product: RecordId,
    pub qty: i64,
}

// =============================================================================
// Order Repository
// =============================================================================

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::new(db, timeout),
        }
    }

    /// Persist an order, reserving all its line items in the same
    /// transaction. `order.id` must be `None`; the caller passes the
    /// pre-generated record id separately.
    pub async fn create_with_reservation(
        &self,
        order_id: RecordId,
        order: Order,
        reservations: Vec<Reservation>,
    ) -> RepoResult<Order> {
        let order_value = serde_json::to_value(&order)
            .map_err(|e| RepoError::Database(format!("Failed to encode order: {e}")))?;

        self.base
            .guard("order.create", async {
                let mut attempt = 0;
                loop {
                    let result = async {
                        let mut response = self
                            .base
                            .db()
                            .query(PLACE_ORDER_QUERY)
                            .bind(("items", reservations.clone()))
                            .bind(("order_id", order_id.clone()))
                            .bind(("order", order_value.clone()))
                            .await?;
                        match take_statement_errors(&mut response) {
                            None => Ok(()),
                            Some(err) => Err(err),
                        }
                    }
                    .await;

                    match result {
                        Err(RepoError::TxConflict(msg)) => {
                            attempt += 1;
                            if attempt >= MAX_TX_RETRIES {
                                return Err(RepoError::Database(msg));
                            }
                            tokio::task::yield_now().await;
                        }
                        other => return other,
                    }
                }
            })
            .await?;

        self.find_by_id(&order_id.to_string())
            .await?
            .ok_or_else(|| RepoError::Database("Order missing after create".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = record_id(ORDER_TABLE, id)?;
        self.base
            .guard("order.find_by_id", async {
                let order: Option<Order> = self.base.db().select(rid).await?;
                Ok(order)
            })
            .await
    }

    /// All orders owned by a user, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let user_id = user_id.to_string();
        self.base
            .guard("order.find_by_user", async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
                    .bind(("user", user_id))
                    .await?
                    .take(0)?;
                Ok(orders)
            })
            .await
    }

    /// Every order in the store, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        self.base
            .guard("order.find_all", async {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query("SELECT * FROM order ORDER BY created_at DESC")
                    .await?
                    .take(0)?;
                Ok(orders)
            })
            .await
    }

    /// Mark an order paid. Idempotent: a repeated payment callback keeps
    /// the original `paid_at` and payment metadata.
    pub async fn mark_paid(
        &self,
        id: &str,
        payment: PaymentResult,
        now: DateTime<Utc>,
    ) -> RepoResult<Order> {
        let rid = record_id(ORDER_TABLE, id)?;
        let payment_value = serde_json::to_value(&payment)
            .map_err(|e| RepoError::Database(format!("Failed to encode payment: {e}")))?;

        self.base
            .guard("order.mark_paid", async {
                let mut result = self
                    .base
                    .db()
                    .query(
                        "UPDATE $order SET \
                            is_paid = true, \
                            paid_at = paid_at ?? $now, \
                            payment_result = payment_result ?? $payment \
                         RETURN AFTER",
                    )
                    .bind(("order", rid))
                    .bind(("now", now))
                    .bind(("payment", payment_value))
                    .await?;
                let orders: Vec<Order> = result.take(0)?;
                orders
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
            })
            .await
    }

    /// Mark an order delivered. Returns `None` when the order exists but is
    /// not paid yet; idempotent once delivered.
    pub async fn mark_delivered(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Order>> {
        let rid = record_id(ORDER_TABLE, id)?;
        self.base
            .guard("order.mark_delivered", async {
                let mut result = self
                    .base
                    .db()
                    .query(
                        "UPDATE $order SET \
                            is_delivered = true, \
                            delivered_at = delivered_at ?? $now \
                         WHERE is_paid = true \
                         RETURN AFTER",
                    )
                    .bind(("order", rid))
                    .bind(("now", now))
                    .await?;
                let orders: Vec<Order> = result.take(0)?;
                Ok(orders.into_iter().next())
            })
            .await
    }
}
