//! Product Model
//!
//! Products own their review list; `rating` and `num_reviews` are cached
//! aggregates recomputed from `reviews` inside the same transaction that
//! mutates the list.

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Image reference handed over by the image-hosting collaborator.
/// The core never sees raw bytes, only this pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub public_id: String,
}

/// Customer review, embedded in the product document.
/// Immutable once created; at most one per (product, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub user_name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: ImageRef,
    pub price: f64,
    #[serde(default)]
    pub count_in_stock: i64,
    /// Insertion order = submission order
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Cached mean of review ratings, 1 decimal place, 0.0 when unreviewed
    #[serde(default)]
    pub rating: f64,
    /// Cached `reviews.len()`
    #[serde(default)]
    pub num_reviews: i64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Review left by `user`, if any
    pub fn review_by(&self, user: &RecordId) -> Option<&Review> {
        self.reviews.iter().find(|r| &r.user == user)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<ImageRef>,
    pub price: f64,
    pub count_in_stock: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_in_stock: Option<i64>,
}

/// Product listing query
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Case-insensitive substring match on name
    pub keyword: Option<String>,
    pub category: Option<String>,
    /// 1-based page number
    pub page: u64,
    pub page_size: u64,
}

/// One page of products plus the total match count
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}
