//! Database models
//!
//! Documents stored in SurrealDB plus their create/update payload structs.

pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod user;

pub use order::{Order, OrderId, OrderItem, OrderItemInput, PaymentResult, ShippingAddress};
pub use product::{
    ImageRef, ListQuery, Product, ProductCreate, ProductId, ProductPage, ProductUpdate, Review,
};
pub use user::{User, UserCreate, UserId, UserUpdate};
