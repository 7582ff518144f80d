//! Review Aggregator
//!
//! Appends customer reviews and keeps the cached `rating`/`num_reviews`
//! pair consistent with the underlying list. The append and the aggregate
//! recompute are one database transaction; the mean is always recomputed
//! from the full list, never tracked incrementally.

use crate::auth::Identity;
use crate::db::models::Review;
use crate::db::repository::{ProductRepository, RepoError, record_id};
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Review submission payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewInput {
    /// Star rating, whole stars only
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
    #[validate(length(min = 10, max = 200))]
    pub comment: String,
}

#[derive(Clone)]
pub struct ReviewService {
    products: ProductRepository,
}

impl ReviewService {
    pub fn new(products: ProductRepository) -> Self {
        Self { products }
    }

    /// Add a review to a product.
    ///
    /// Preconditions, checked in order: product exists, comment length,
    /// rating range, no prior review by this user. The duplicate check is
    /// repeated inside the append transaction together with the aggregate
    /// recompute, so two concurrent reviewers cannot lose an update or
    /// double-review.
    pub async fn add_review(
        &self,
        actor: &Identity,
        product_id: &str,
        input: ReviewInput,
    ) -> AppResult<Review> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", product_id)))?;
        input
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let reviewer = record_id("user", &actor.user_id)?;
        if product.review_by(&reviewer).is_some() {
            return Err(AppError::DuplicateReview);
        }

        let review = Review {
            id: Uuid::new_v4().to_string(),
            user: reviewer,
            user_name: actor.name.clone(),
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        };

        match self.products.append_review(product_id, review.clone()).await {
            Ok(()) => {
                tracing::info!(product = %product_id, user = %actor.user_id, "Review added");
                Ok(review)
            }
            Err(RepoError::Duplicate(_)) => Err(AppError::DuplicateReview),
            Err(e) => Err(e.into()),
        }
    }
}
