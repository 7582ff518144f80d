//! Order Engine
//!
//! Builds orders from cart snapshots, computes totals server-side from
//! live catalog prices, reserves stock transactionally, and drives the
//! Created → Paid → Delivered state machine.

pub mod inventory;
pub mod money;

pub use inventory::InventoryLedger;

use crate::auth::{Identity, require_admin, require_self_or_admin};
use crate::core::config::PricingPolicy;
use crate::db::models::{Order, OrderItem, OrderItemInput, PaymentResult, ShippingAddress};
use crate::db::repository::{OrderRepository, ProductRepository, Reservation, record_id};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use futures::future::try_join_all;
use surrealdb::RecordId;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderService {
    products: ProductRepository,
    orders: OrderRepository,
    policy: PricingPolicy,
}

impl OrderService {
    pub fn new(
        products: ProductRepository,
        orders: OrderRepository,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            products,
            orders,
            policy,
        }
    }

    /// Place an order from a cart snapshot.
    ///
    /// Prices and names are snapshotted from the live catalog; the client
    /// only supplies product ids and quantities. All reservations and the
    /// order insert commit together or not at all.
    pub async fn place_order(
        &self,
        actor: &Identity,
        items: Vec<OrderItemInput>,
        shipping_address: ShippingAddress,
        payment_method: String,
    ) -> AppResult<Order> {
        if items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }
        for item in &items {
            if item.qty <= 0 {
                return Err(AppError::validation(format!(
                    "Quantity must be positive, got {}",
                    item.qty
                )));
            }
        }
        validate_required_text(&payment_method, "payment_method", MAX_NAME_LEN)?;
        validate_shipping_address(&shipping_address)?;

        // Fetch every product live; a single missing product fails the
        // whole order before anything is written.
        let fetches = items.iter().map(|i| self.products.find_by_id(&i.product_id));
        let fetched = try_join_all(fetches).await?;

        let mut order_items = Vec::with_capacity(items.len());
        let mut reservations = Vec::with_capacity(items.len());
        for (input, product) in items.iter().zip(fetched) {
            let product = product.ok_or_else(|| {
                AppError::not_found(format!("Product {} not found", input.product_id))
            })?;
            let product_id = product
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Product record missing id"))?;
            order_items.push(OrderItem {
                product: product_id.clone(),
                name: product.name.clone(),
                image: product.image.clone(),
                price: product.price,
                qty: input.qty,
            });
            reservations.push(Reservation {
                product: product_id,
                qty: input.qty,
            });
        }

        let totals = money::compute_totals(&order_items, &self.policy);
        let user: RecordId = record_id("user", &actor.user_id)?;

        let order = Order {
            id: None,
            user,
            items: order_items,
            shipping_address,
            payment_method,
            items_price: totals.items_price,
            shipping_price: totals.shipping_price,
            tax_price: totals.tax_price,
            total_price: totals.total_price,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        };

        let order_id = RecordId::from_table_key("order", Uuid::new_v4().simple().to_string());
        let created = self
            .orders
            .create_with_reservation(order_id, order, reservations)
            .await?;

        tracing::info!(
            order = %created.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            user = %actor.user_id,
            total = created.total_price,
            "Order placed"
        );
        Ok(created)
    }

    /// Record a payment confirmation from the payment collaborator.
    /// Repeated callbacks are a no-op, not an error.
    pub async fn mark_paid(
        &self,
        actor: &Identity,
        order_id: &str,
        payment: PaymentResult,
    ) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        require_self_or_admin(actor, &order.user.to_string())?;

        let updated = self.orders.mark_paid(order_id, payment, Utc::now()).await?;
        tracing::info!(order = %order_id, "Order marked paid");
        Ok(updated)
    }

    /// Mark an order delivered (admin only). Rejected until the order is
    /// paid; idempotent afterwards.
    pub async fn mark_delivered(&self, actor: &Identity, order_id: &str) -> AppResult<Order> {
        require_admin(actor)?;
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        if !order.is_paid {
            return Err(AppError::invalid_state("Order is not paid yet"));
        }

        match self.orders.mark_delivered(order_id, Utc::now()).await? {
            Some(updated) => {
                tracing::info!(order = %order_id, "Order marked delivered");
                Ok(updated)
            }
            // The update itself is guarded on is_paid
            None => Err(AppError::invalid_state("Order is not paid yet")),
        }
    }

    /// Fetch one order: owner or admin only
    pub async fn get_order(&self, actor: &Identity, order_id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        require_self_or_admin(actor, &order.user.to_string())?;
        Ok(order)
    }

    /// Orders owned by the acting user, newest first
    pub async fn list_my_orders(&self, actor: &Identity) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_by_user(&actor.user_id).await?)
    }

    /// Every order (admin only), newest first
    pub async fn list_all_orders(&self, actor: &Identity) -> AppResult<Vec<Order>> {
        require_admin(actor)?;
        Ok(self.orders.find_all().await?)
    }
}

fn validate_shipping_address(address: &ShippingAddress) -> AppResult<()> {
    use crate::utils::validation::MAX_ADDRESS_LEN;
    validate_required_text(&address.address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(&address.city, "city", MAX_NAME_LEN)?;
    validate_required_text(&address.postal_code, "postal_code", MAX_NAME_LEN)?;
    validate_required_text(&address.country, "country", MAX_NAME_LEN)?;
    Ok(())
}
