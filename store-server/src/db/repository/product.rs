//! Product Repository
//!
//! Owns the product documents, including the embedded review list and the
//! stock counter. Review aggregation and stock reservation are transactional
//! single queries; the cached `rating`/`num_reviews` pair is always
//! recomputed from the full review list, never tracked incrementally.

use super::{
    BaseRepository, MAX_TX_RETRIES, RepoError, RepoResult, record_id, take_statement_errors,
};
use crate::db::models::{ListQuery, Product, ProductCreate, ProductUpdate, Review};
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

/// Appends a review and recomputes the cached aggregate in one transaction.
/// A reader can never observe the list and the aggregate out of sync.
const APPEND_REVIEW_QUERY: &str = r#"
BEGIN TRANSACTION;
LET $prod = (SELECT * FROM $product)[0];
IF $prod == NONE { THROW "PRODUCT_NOT_FOUND" };
IF array::len($prod.reviews[WHERE user = $reviewer]) > 0 { THROW "REVIEW_EXISTS" };
LET $reviews = array::append($prod.reviews, $review);
UPDATE $product SET
    reviews = $reviews,
    num_reviews = array::len($reviews),
    rating = math::fixed(math::mean($reviews.rating), 1);
COMMIT TRANSACTION;
"#;

/// Compare-and-decrement for a single product. The stock check and the
/// decrement are one conditional update, so a failure never decrements.
const RESERVE_QUERY: &str = r#"
BEGIN TRANSACTION;
LET $prod = (SELECT * FROM $product)[0];
IF $prod == NONE { THROW "PRODUCT_NOT_FOUND" };
LET $updated = (UPDATE $product SET count_in_stock -= $qty WHERE count_in_stock >= $qty);
IF array::len($updated) == 0 { THROW "OUT_OF_STOCK" };
COMMIT TRANSACTION;
"#;

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::new(db, timeout),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        self.base
            .guard("product.find_by_id", async {
                let product: Option<Product> = self.base.db().select(rid).await?;
                Ok(product)
            })
            .await
    }

    /// List products with optional keyword/category filter, newest first,
    /// ties broken by id. Returns the page plus the total match count.
    pub async fn list(&self, query: &ListQuery) -> RepoResult<(Vec<Product>, u64)> {
        let mut conditions: Vec<&str> = Vec::new();
        if query.keyword.is_some() {
            conditions.push("string::contains(string::lowercase(name), $keyword)");
        }
        if query.category.is_some() {
            conditions.push("category = $category");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let page = query.page.max(1);
        let page_size = query.page_size.max(1);
        let start = (page - 1) * page_size;

        let sql = format!(
            "SELECT * FROM product {where_clause} \
             ORDER BY created_at DESC, id ASC LIMIT $limit START $start; \
             SELECT count() AS total FROM product {where_clause} GROUP ALL;"
        );

        let mut request = self
            .base
            .db()
            .query(sql)
            .bind(("limit", page_size as i64))
            .bind(("start", start as i64));
        if let Some(keyword) = &query.keyword {
            request = request.bind(("keyword", keyword.to_lowercase()));
        }
        if let Some(category) = &query.category {
            request = request.bind(("category", category.clone()));
        }

        self.base
            .guard("product.list", async {
                let mut result = request.await?;
                let products: Vec<Product> = result.take(0)?;
                let counts: Vec<CountRow> = result.take(1)?;
                let total = counts.first().map(|c| c.total).unwrap_or(0);
                Ok((products, total))
            })
            .await
    }

    /// Top-rated products for the storefront carousel
    pub async fn top_rated(&self, limit: i64) -> RepoResult<Vec<Product>> {
        self.base
            .guard("product.top_rated", async {
                let products: Vec<Product> = self
                    .base
                    .db()
                    .query("SELECT * FROM product ORDER BY rating DESC LIMIT $limit")
                    .bind(("limit", limit))
                    .await?
                    .take(0)?;
                Ok(products)
            })
            .await
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = Product {
            id: None,
            name: data.name,
            brand: data.brand,
            category: data.category,
            description: data.description,
            image: data.image.unwrap_or_default(),
            price: data.price,
            count_in_stock: data.count_in_stock.unwrap_or(0),
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            created_at: Utc::now(),
        };

        self.base
            .guard("product.create", async {
                let created: Option<Product> = self
                    .base
                    .db()
                    .create(PRODUCT_TABLE)
                    .content(product)
                    .await?;
                created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
            })
            .await
    }

    /// Update a product. Only catalog fields are writable here; the review
    /// list and its aggregate move exclusively through `append_review`.
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let rid = record_id(PRODUCT_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.brand.is_some() {
            set_parts.push("brand = $brand");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.image.is_some() {
            set_parts.push("image = $image");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.count_in_stock.is_some() {
            set_parts.push("count_in_stock = $count_in_stock");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut request = self.base.db().query(query_str).bind(("thing", rid));
        if let Some(v) = data.name {
            request = request.bind(("name", v));
        }
        if let Some(v) = data.brand {
            request = request.bind(("brand", v));
        }
        if let Some(v) = data.category {
            request = request.bind(("category", v));
        }
        if let Some(v) = data.description {
            request = request.bind(("description", v));
        }
        if let Some(v) = data.image {
            // embedded objects bind as JSON values
            request = request.bind(("image", serde_json::to_value(&v).unwrap_or_default()));
        }
        if let Some(v) = data.price {
            request = request.bind(("price", v));
        }
        if let Some(v) = data.count_in_stock {
            request = request.bind(("count_in_stock", v));
        }

        self.base
            .guard("product.update", async {
                let mut result = request.await?;
                let products: Vec<Product> = result.take(0)?;
                products
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
            })
            .await
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        self.base
            .guard("product.delete", async {
                let deleted: Option<Product> = self.base.db().delete(rid).await?;
                if deleted.is_none() {
                    return Err(RepoError::NotFound(format!("Product {} not found", id)));
                }
                Ok(())
            })
            .await
    }

    /// Append a review and recompute `rating`/`num_reviews` atomically.
    ///
    /// Fails with [`RepoError::Duplicate`] when this user already reviewed
    /// the product, [`RepoError::NotFound`] when the product is gone.
    pub async fn append_review(&self, product_id: &str, review: Review) -> RepoResult<()> {
        let rid = record_id(PRODUCT_TABLE, product_id)?;
        let reviewer = review.user.to_string();
        let review_value = serde_json::to_value(&review)
            .map_err(|e| RepoError::Database(format!("Failed to encode review: {e}")))?;

        self.base
            .guard("product.append_review", async {
                let mut attempt = 0;
                loop {
                    let result = async {
                        let mut response = self
                            .base
                            .db()
                            .query(APPEND_REVIEW_QUERY)
                            .bind(("product", rid.clone()))
                            .bind(("reviewer", reviewer.clone()))
                            .bind(("review", review_value.clone()))
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
            .await
    }

    /// Reserve stock for a single product: validate and decrement as one
    /// atomic step. Never leaves a partial decrement behind.
    pub async fn reserve(&self, product_id: &str, qty: i64) -> RepoResult<()> {
        if qty <= 0 {
            return Err(RepoError::Validation(format!(
                "Quantity must be positive, got {qty}"
            )));
        }
        let rid = record_id(PRODUCT_TABLE, product_id)?;
        self.base
            .guard("product.reserve", async {
                let mut attempt = 0;
                loop {
                    let result = async {
                        let mut response = self
                            .base
                            .db()
                            .query(RESERVE_QUERY)
                            .bind(("product", rid.clone()))
                            .bind(("qty", qty))
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
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{THROW_OUT_OF_STOCK, THROW_PRODUCT_NOT_FOUND, THROW_REVIEW_EXISTS};

    // The sentinel constants must stay in sync with the raw queries
    #[test]
    fn test_queries_carry_sentinels() {
        assert!(APPEND_REVIEW_QUERY.contains(THROW_PRODUCT_NOT_FOUND));
        assert!(APPEND_REVIEW_QUERY.contains(THROW_REVIEW_EXISTS));
        assert!(RESERVE_QUERY.contains(THROW_PRODUCT_NOT_FOUND));
        assert!(RESERVE_QUERY.contains(THROW_OUT_OF_STOCK));
    }
}
