//! Money calculation utilities using rust_decimal for precision
//!
//! All totals are computed with `Decimal` internally, then converted to
//! `f64` for storage/serialization. Prices always come from the live
//! catalog at order time, never from the client.

use crate::core::config::PricingPolicy;
use crate::db::models::OrderItem;
use rust_decimal::prelude::*;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Server-side order totals
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub items_price: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub total_price: f64,
}

/// Compute all order totals from line-item snapshots.
///
/// - `items_price` = Σ price × qty
/// - `shipping_price` = flat fee, waived above the free-shipping threshold
/// - `tax_price` = tax percentage of `items_price`
/// - `total_price` = items + shipping + tax
pub fn compute_totals(items: &[OrderItem], policy: &PricingPolicy) -> OrderTotals {
    let items_price: Decimal = items
        .iter()
        .map(|item| to_decimal(item.price) * Decimal::from(item.qty))
        .sum();
    let items_price =
        items_price.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);

    let shipping_price = if items_price > to_decimal(policy.free_shipping_threshold) {
        Decimal::ZERO
    } else {
        to_decimal(policy.shipping_fee)
    };

    let tax_price = (items_price * to_decimal(policy.tax_rate_percent) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);

    let total_price = items_price + shipping_price + tax_price;

    OrderTotals {
        items_price: to_f64(items_price),
        shipping_price: to_f64(shipping_price),
        tax_price: to_f64(tax_price),
        total_price: to_f64(total_price),
    }
}
