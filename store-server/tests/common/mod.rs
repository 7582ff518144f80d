//! Shared helpers for the integration suite
#![allow(dead_code)]

use store_server::auth::Identity;
use store_server::core::{Config, StoreState};
use store_server::db::models::{
    ImageRef, Order, OrderItemInput, Product, ProductCreate, ShippingAddress,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Fresh in-memory state with a deterministic JWT secret
pub async fn test_state() -> StoreState {
    store_server::init_logger();
    let mut config = Config::from_env();
    config.jwt.secret = TEST_JWT_SECRET.to_string();
    StoreState::initialize_in_memory(&config)
        .await
        .expect("Failed to initialize in-memory state")
}

pub fn admin_identity() -> Identity {
    Identity {
        user_id: "user:admin".to_string(),
        name: "Admin".to_string(),
        is_admin: true,
    }
}

pub fn customer(key: &str, name: &str) -> Identity {
    Identity {
        user_id: format!("user:{key}"),
        name: name.to_string(),
        is_admin: false,
    }
}

pub async fn seed_product(state: &StoreState, name: &str, price: f64, stock: i64) -> Product {
    state
        .catalog
        .create_product(
            &admin_identity(),
            ProductCreate {
                name: name.to_string(),
                brand: "Acme".to_string(),
                category: "gear".to_string(),
                description: "Seeded product for the integration suite".to_string(),
                image: Some(ImageRef {
                    url: format!("https://cdn.example.com/{name}.jpg"),
                    public_id: format!("store/{name}"),
                }),
                price,
                count_in_stock: Some(stock),
            },
        )
        .await
        .expect("Failed to seed product")
}

/// "product:xxx" id of a seeded product
pub fn pid(product: &Product) -> String {
    product.id.as_ref().expect("product id").to_string()
}

/// "order:xxx" id of a placed order
pub fn oid(order: &Order) -> String {
    order.id.as_ref().expect("order id").to_string()
}

pub fn shipping() -> ShippingAddress {
    ShippingAddress {
        address: "1 Main Street".to_string(),
        city: "Lisbon".to_string(),
        postal_code: "1000-001".to_string(),
        country: "Portugal".to_string(),
    }
}

pub fn line(product: &Product, qty: i64) -> OrderItemInput {
    OrderItemInput {
        product_id: pid(product),
        qty,
    }
}

pub async fn stock_of(state: &StoreState, product_id: &str) -> i64 {
    state
        .catalog
        .get_product(product_id)
        .await
        .expect("product should exist")
        .count_in_stock
}
