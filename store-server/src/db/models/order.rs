//! Order Model
//!
//! Line items carry owned price/name/image snapshots taken at order time,
//! so later catalog edits never rewrite order history. After creation only
//! the paid/delivered state fields may change.

use super::serde_helpers;
use super::{ImageRef, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type OrderId = RecordId;

/// One (product, quantity) pair with its snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub name: String,
    #[serde(default)]
    pub image: ImageRef,
    pub price: f64,
    pub qty: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Opaque payment confirmation metadata from the payment collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub update_time: String,
    #[serde(default)]
    pub email_address: String,
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    /// Owning user
    #[serde(with = "serde_helpers::record_id")]
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub total_price: f64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<PaymentResult>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One requested line item in a checkout
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub product_id: String,
    pub qty: i64,
}
